//! Descriptive statistics used by the chart generators
//!
//! Caps and rolling windows are Polars expressions so the generators can run
//! them inside their lazy queries. LOWESS works on the collected points.

use polars::prelude::*;

/// Percentile used for outlier removal
pub const OUTLIER_QUANTILE: f64 = 0.99;

/// Fraction of points in each LOWESS neighbourhood
pub const LOWESS_FRACTION: f64 = 2.0 / 3.0;

/// Robustifying passes after the initial LOWESS fit
pub const LOWESS_ITERATIONS: usize = 3;

/// 99th percentile of a column, linearly interpolated over its non-null values
pub fn outlier_cap(column: &str) -> Expr {
    col(column).quantile(lit(OUTLIER_QUANTILE), QuantileMethod::Linear)
}

/// True where a value is present and strictly below its column's 99th percentile
///
/// The cap is an aggregate over the whole column, so it is computed before any
/// row is filtered out when used as a predicate.
pub fn below_outlier_cap(column: &str) -> Expr {
    col(column).lt(outlier_cap(column))
}

/// Trailing simple moving average; the window shrinks at the start of the series
pub fn trailing_mean(values: Expr, window: usize) -> Expr {
    values.rolling_mean(RollingOptionsFixedWindow {
        window_size: window.max(1),
        min_periods: 1,
        ..Default::default()
    })
}

/// Number of points each local LOWESS fit uses: `floor(fraction * n)`, at least 2
pub fn neighbourhood_size(fraction: f64, n: usize) -> usize {
    // The epsilon keeps exact products like 2/3 * 3 from rounding down
    let size = (fraction * n as f64 + 1e-10) as usize;
    size.clamp(2.min(n), n)
}

/// Locally weighted scatterplot smoothing
///
/// Each point is fitted by a weighted linear regression over its
/// [`neighbourhood_size`] nearest neighbours using tricube distance weights,
/// then refined `iterations` times with bisquare robustness weights on the
/// residuals. Returns the fitted curve as `(x, y_hat)` pairs sorted by `x`.
pub fn lowess(points: &[(f64, f64)], fraction: f64, iterations: usize) -> Vec<(f64, f64)> {
    let mut sorted: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = sorted.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return sorted;
    }

    let xs: Vec<f64> = sorted.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = sorted.iter().map(|p| p.1).collect();
    let neighbours = neighbourhood_size(fraction, n);

    let mut robustness = vec![1.0; n];
    let mut fitted = vec![0.0; n];

    for pass in 0..=iterations {
        for i in 0..n {
            fitted[i] = local_fit(&xs, &ys, &robustness, i, neighbours);
        }
        if pass == iterations {
            break;
        }

        let residuals: Vec<f64> = ys.iter().zip(&fitted).map(|(y, f)| (y - f).abs()).collect();
        let scale = median_of(residuals.clone());
        if scale <= f64::EPSILON {
            break;
        }
        for (weight, residual) in robustness.iter_mut().zip(&residuals) {
            let u = residual / (6.0 * scale);
            *weight = if u < 1.0 { (1.0 - u * u).powi(2) } else { 0.0 };
        }
    }

    xs.into_iter().zip(fitted).collect()
}

fn median_of(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Weighted linear fit at `xs[i]` over its nearest neighbours
fn local_fit(xs: &[f64], ys: &[f64], robustness: &[f64], i: usize, neighbours: usize) -> f64 {
    let n = xs.len();
    let x0 = xs[i];

    // Slide a window of `neighbours` sorted points until it is centred on x0
    let mut left = i.saturating_sub(neighbours - 1).min(n - neighbours);
    while left + neighbours < n && x0 - xs[left] > xs[left + neighbours] - x0 {
        left += 1;
    }
    let right = left + neighbours - 1;
    let radius = (x0 - xs[left]).max(xs[right] - x0);

    let mut sum_w = 0.0;
    let mut sum_wx = 0.0;
    let mut sum_wy = 0.0;
    let mut sum_wxx = 0.0;
    let mut sum_wxy = 0.0;

    for j in left..=right {
        let distance = (xs[j] - x0).abs();
        let tricube = if radius > 0.0 {
            let u = distance / radius;
            if u < 1.0 {
                (1.0 - u.powi(3)).powi(3)
            } else {
                0.0
            }
        } else {
            1.0
        };
        let w = tricube * robustness[j];
        sum_w += w;
        sum_wx += w * xs[j];
        sum_wy += w * ys[j];
        sum_wxx += w * xs[j] * xs[j];
        sum_wxy += w * xs[j] * ys[j];
    }

    if sum_w <= 0.0 {
        return ys[i];
    }

    let mean_x = sum_wx / sum_w;
    let mean_y = sum_wy / sum_w;
    let variance = sum_wxx / sum_w - mean_x * mean_x;
    // Flat neighbourhoods degrade to a weighted mean
    if variance.abs() <= f64::EPSILON * mean_x.abs().max(1.0) {
        return mean_y;
    }
    let slope = (sum_wxy / sum_w - mean_x * mean_y) / variance;
    mean_y + slope * (x0 - mean_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn float_values(frame: &DataFrame, column: &str) -> Vec<Option<f64>> {
        frame
            .column(column)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_outlier_cap_interpolates_linearly() {
        let frame = df!("sales" => &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let caps = frame.lazy().select([outlier_cap("sales")]).collect().unwrap();
        assert_close(float_values(&caps, "sales")[0].unwrap(), 4.96);
    }

    #[test]
    fn test_outlier_cap_excludes_threshold_row() {
        // Every value equal: the cap equals the value, so nothing passes
        let frame = df!("sales" => &[100.0; 10]).unwrap();
        let kept = frame.lazy().filter(below_outlier_cap("sales")).collect().unwrap();
        assert_eq!(kept.height(), 0);

        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        let frame = df!("sales" => &values).unwrap();
        let caps = frame.clone().lazy().select([outlier_cap("sales")]).collect().unwrap();
        assert_close(float_values(&caps, "sales")[0].unwrap(), 99.01);

        let kept = frame.lazy().filter(below_outlier_cap("sales")).collect().unwrap();
        assert_eq!(kept.height(), 99);
    }

    #[test]
    fn test_below_outlier_cap_rejects_missing_values() {
        let frame = df!("sales" => &[Some(1.0), None, Some(2.0), Some(50.0)]).unwrap();
        let kept = frame.lazy().filter(below_outlier_cap("sales")).collect().unwrap();
        assert_eq!(float_values(&kept, "sales"), vec![Some(1.0), Some(2.0)]);

        let empty = df!("sales" => &[None::<f64>, None]).unwrap();
        let kept = empty.lazy().filter(below_outlier_cap("sales")).collect().unwrap();
        assert_eq!(kept.height(), 0);
    }

    #[test]
    fn test_trailing_mean_shrinking_window() {
        let frame = df!("median" => &[10.0, 20.0, 30.0, 40.0]).unwrap();
        let rolled = frame
            .lazy()
            .select([trailing_mean(col("median"), 3)])
            .collect()
            .unwrap();
        let expected = [10.0, 15.0, 20.0, 30.0];
        for (value, expected) in float_values(&rolled, "median").into_iter().zip(expected) {
            assert_close(value.unwrap(), expected);
        }
    }

    #[test]
    fn test_neighbourhood_size_rounds_down() {
        assert_eq!(neighbourhood_size(LOWESS_FRACTION, 5), 3);
        assert_eq!(neighbourhood_size(LOWESS_FRACTION, 3), 2);
        assert_eq!(neighbourhood_size(LOWESS_FRACTION, 30), 20);
        assert_eq!(neighbourhood_size(LOWESS_FRACTION, 2), 2);
        assert_eq!(neighbourhood_size(0.1, 5), 2);
        assert_eq!(neighbourhood_size(LOWESS_FRACTION, 1), 1);
    }

    #[test]
    fn test_lowess_reproduces_a_line() {
        let points: Vec<(f64, f64)> = (0..20).map(|i| (f64::from(i), 2.0 * f64::from(i) + 1.0)).collect();
        let smoothed = lowess(&points, LOWESS_FRACTION, LOWESS_ITERATIONS);
        assert_eq!(smoothed.len(), points.len());
        for ((x, y_hat), (_, y)) in smoothed.iter().zip(&points) {
            assert!((y_hat - y).abs() < 1e-6, "x={x}: {y_hat} vs {y}");
        }
    }

    #[test]
    fn test_lowess_resists_a_single_outlier() {
        let mut points: Vec<(f64, f64)> = (0..30).map(|i| (f64::from(i), f64::from(i))).collect();
        points[15].1 = 500.0;
        let smoothed = lowess(&points, LOWESS_FRACTION, LOWESS_ITERATIONS);
        let (_, at_outlier) = smoothed[15];
        assert!((at_outlier - 15.0).abs() < 2.0, "fit pulled to {at_outlier}");
    }

    #[test]
    fn test_lowess_sorts_and_handles_tiny_inputs() {
        assert!(lowess(&[], LOWESS_FRACTION, LOWESS_ITERATIONS).is_empty());
        assert_eq!(lowess(&[(1.0, 2.0)], LOWESS_FRACTION, LOWESS_ITERATIONS), vec![(1.0, 2.0)]);

        let smoothed = lowess(&[(3.0, 3.0), (1.0, 1.0), (2.0, 2.0)], LOWESS_FRACTION, 0);
        let xs: Vec<f64> = smoothed.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_lowess_constant_x_returns_mean() {
        let smoothed = lowess(&[(5.0, 1.0), (5.0, 3.0)], LOWESS_FRACTION, 0);
        for (_, y) in smoothed {
            assert_close(y, 2.0);
        }
    }
}
