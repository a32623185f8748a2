//! Descriptive statistics over plain `f64` slices.
//!
//! Callers filter missing values before calling in; every function here
//! assumes finite input and returns `None` where the statistic is undefined.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom
/// (0 = population, 1 = sample).
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    let n = values.len();
    if n <= ddof {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    Some((sum_sq / (n - ddof) as f64).sqrt())
}

/// Quantile by linear interpolation between closest ranks
/// (`h = (n - 1) * p`, Hyndman & Fan type 7).
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(quantile_sorted(&sorted, p))
}

/// Same as [`quantile`] over an already ascending, non-empty slice
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Pearson correlation of paired observations
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some((cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 100.0]), Some(22.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev_population_and_sample() {
        let data = [1.0, 2.0, 3.0, 4.0, 100.0];
        let pop = std_dev(&data, 0).unwrap();
        let sample = std_dev(&data, 1).unwrap();
        assert!((pop - 1522.0_f64.sqrt()).abs() < EPS);
        assert!((sample - 1902.5_f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_std_dev_too_few_values() {
        assert_eq!(std_dev(&[5.0], 1), None);
        assert_eq!(std_dev(&[5.0], 0), Some(0.0));
        assert_eq!(std_dev(&[], 0), None);
    }

    #[test]
    fn test_quantile_linear() {
        let data = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_eq!(quantile(&data, 0.25), Some(2.0));
        assert_eq!(quantile(&data, 0.5), Some(3.0));
        assert_eq!(quantile(&data, 0.75), Some(4.0));
        // Interpolated between 1 and 2
        assert_eq!(quantile(&[2.0, 1.0], 0.5), Some(1.5));
        assert_eq!(quantile(&[7.0], 0.9), Some(7.0));
    }

    #[test]
    fn test_quantile_out_of_range() {
        assert_eq!(quantile(&[1.0, 2.0], 1.5), None);
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_pearson() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < EPS);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < EPS);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
    }
}
