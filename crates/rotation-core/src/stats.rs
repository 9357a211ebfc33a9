//! Rolling-window statistics shared by the rotation engine and the trend
//! screener. The `Option`-valued variants mark positions where the window
//! is incomplete, a value is missing, or the statistic is degenerate.

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Rolling mean over a possibly-gapped series. `result[t]` is `Some` only
/// when all `window` values ending at `t` are present.
pub fn rolling_mean(data: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if window == 0 || data.len() < window {
        return result;
    }

    for i in window - 1..data.len() {
        let slice = &data[i + 1 - window..=i];
        if slice.iter().all(Option::is_some) {
            let sum: f64 = slice.iter().map(|v| v.unwrap()).sum();
            result[i] = Some(sum / window as f64);
        }
    }
    result
}

/// Rolling population standard deviation (divide by the window size, not
/// window − 1), with the same missing-value semantics as [`rolling_mean`].
pub fn rolling_std_pop(data: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if window == 0 || data.len() < window {
        return result;
    }

    for i in window - 1..data.len() {
        let slice = &data[i + 1 - window..=i];
        if slice.iter().all(Option::is_some) {
            let mean: f64 = slice.iter().map(|v| v.unwrap()).sum::<f64>() / window as f64;
            let variance: f64 = slice
                .iter()
                .map(|v| (v.unwrap() - mean).powi(2))
                .sum::<f64>()
                / window as f64;
            result[i] = Some(variance.sqrt());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert!(sma(&data, 5).is_empty());
    }

    #[test]
    fn test_rolling_mean_window_boundary() {
        let data: Vec<Option<f64>> = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let result = rolling_mean(&data, 3);

        assert_eq!(result.len(), 4);
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert!((result[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((result[3].unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_mean_gap_poisons_window() {
        let data: Vec<Option<f64>> = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let result = rolling_mean(&data, 3);

        // Windows covering the gap stay missing; the first clean window is
        // at index 4.
        assert!(result[2].is_none());
        assert!(result[3].is_none());
        assert!((result[4].unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_std_population_divisor() {
        let data: Vec<Option<f64>> = vec![Some(2.0), Some(4.0), Some(4.0), Some(4.0), Some(5.0), Some(5.0), Some(7.0), Some(9.0)];
        let result = rolling_std_pop(&data, 8);

        // Classic population-std example: mean 5, variance 4, std 2.
        assert!((result[7].unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_std_constant_window_is_zero() {
        let data: Vec<Option<f64>> = vec![Some(3.0); 6];
        let result = rolling_std_pop(&data, 4);

        assert!((result[5].unwrap() - 0.0).abs() < 1e-12);
    }
}
