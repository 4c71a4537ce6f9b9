//! Shared numeric kernels
//!
//! Small composable functions over `f64` slices. Callers strip missing
//! values first, so inputs contain no NaN; degenerate sample sizes return
//! NaN rather than erroring.

/// Threshold below which a regression denominator counts as zero
pub const DEGENERACY_EPS: f64 = 1e-12;

/// Sum of all values
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

/// Sample variance (divisor n - 1); NaN when fewer than two values
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    ss / (values.len() - 1) as f64
}

/// Sample standard deviation; NaN when fewer than two values
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// A sorted copy
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Quantile of a sorted slice by linear interpolation.
///
/// The rank is `q * (n - 1)`; values between order statistics are
/// interpolated. NaN for an empty slice.
pub fn quantile_sorted(sorted_values: &[f64], q: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }
    let rank = q * (sorted_values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_values[lo];
    }
    let frac = rank - lo as f64;
    sorted_values[lo] + (sorted_values[hi] - sorted_values[lo]) * frac
}

/// Median of a sorted slice; for even counts, the mean of the two middle
/// order statistics
pub fn median_sorted(sorted_values: &[f64]) -> f64 {
    quantile_sorted(sorted_values, 0.5)
}

/// Smallest value; NaN for an empty slice
pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

/// Largest value; NaN for an empty slice
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

/// Fractional ranks (1-based), tied values receiving the average of
/// their ranks
pub fn fractional_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(f64, usize)> = values.iter().copied().zip(0..).collect();
    indexed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && indexed[j + 1].0 == indexed[i].0 {
            j += 1;
        }
        // Positions i..=j hold one tie run; ranks are 1-based.
        let avg = (i + j + 2) as f64 / 2.0;
        for k in i..=j {
            ranks[indexed[k].1] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Pearson correlation of paired samples.
///
/// NaN when fewer than two pairs or when either sample has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.len() < 2 {
        return f64::NAN;
    }
    let mean_x = mean(xs);
    let mean_y = mean(ys);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x * var_y).sqrt()
}

/// Spearman rank correlation: Pearson over fractional ranks
pub fn spearman(xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.len() < 2 {
        return f64::NAN;
    }
    pearson(&fractional_ranks(xs), &fractional_ranks(ys))
}

/// A fitted least-squares line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Closed-form ordinary least squares over paired samples.
///
/// Degenerate designs (fewer than two points, or all x equal within
/// `DEGENERACY_EPS`) give NaN slope and intercept. `r_squared` is NaN
/// for a degenerate fit or a constant response.
pub fn least_squares(xs: &[f64], ys: &[f64]) -> LineFit {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len() as f64;
    let sum_x = sum(xs);
    let sum_y = sum(ys);
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_xx: f64 = xs.iter().map(|x| x * x).sum();

    let den = n * sum_xx - sum_x * sum_x;
    if xs.len() < 2 || den.abs() < DEGENERACY_EPS {
        return LineFit {
            slope: f64::NAN,
            intercept: f64::NAN,
            r_squared: f64::NAN,
        };
    }
    let slope = (n * sum_xy - sum_x * sum_y) / den;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let fitted = slope * x + intercept;
        ss_res += (y - fitted) * (y - fitted);
        ss_tot += (y - mean_y) * (y - mean_y);
    }
    let r_squared = if ss_tot.abs() < DEGENERACY_EPS {
        f64::NAN
    } else {
        1.0 - ss_res / ss_tot
    };
    LineFit {
        slope,
        intercept,
        r_squared,
    }
}
