/// Root-mean-square error between two equal-length slices.
/// Returns NaN for empty input so callers cannot mistake "no data" for a perfect fit.
pub(crate) fn rmse(predicted: &[f64], actual: &[f64]) -> f64 {
    debug_assert_eq!(predicted.len(), actual.len());
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return f64::NAN;
    }

    let sum_sq: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| {
            let diff = p - a;
            diff * diff
        })
        .sum();

    (sum_sq / n as f64).sqrt()
}
