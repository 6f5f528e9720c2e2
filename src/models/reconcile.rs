//! Maps segment-relative window predictions back onto the absolute index space of
//! the full series, for charting against the actual values.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Two arrays the length of the full series. `None` wherever the segment's windows
/// produced no prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledSeries {
    pub train: Vec<Option<f64>>,
    pub test: Vec<Option<f64>>,
}

/// Places `train_predictions[k]` at index `lookback + k` and `test_predictions[k]` at
/// index `train_len + lookback + k`.
///
/// Window `k` of a segment predicts the value `lookback` positions after the window's
/// first element, and the test segment starts at `train_len`. Any placement past
/// `full_len` is rejected rather than truncated.
pub fn reconcile(
    train_predictions: &[f64],
    test_predictions: &[f64],
    full_len: usize,
    train_len: usize,
    lookback: usize,
) -> Result<ReconciledSeries, DataError> {
    Ok(ReconciledSeries {
        train: place(train_predictions, lookback, full_len)?,
        test: place(test_predictions, train_len + lookback, full_len)?,
    })
}

fn place(predictions: &[f64], offset: usize, full_len: usize) -> Result<Vec<Option<f64>>, DataError> {
    let mut out = vec![None; full_len];
    if predictions.is_empty() {
        return Ok(out);
    }

    let end = offset + predictions.len();
    if end > full_len {
        return Err(DataError::IndexOutOfRange {
            index: end - 1,
            len: full_len,
        });
    }

    for (slot, &p) in out[offset..end].iter_mut().zip(predictions) {
        *slot = Some(p);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(v: &[Option<f64>]) -> Vec<usize> {
        v.iter()
            .enumerate()
            .filter_map(|(i, x)| x.map(|_| i))
            .collect()
    }

    #[test]
    fn test_boundary_scenario_placement() {
        // N = 20, L = 5, ratio 0.6 -> train_len 12, 7 train windows, 3 test windows
        let train: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let test = [100.0, 101.0, 102.0];

        let r = reconcile(&train, &test, 20, 12, 5).unwrap();

        assert_eq!(r.train.len(), 20);
        assert_eq!(r.test.len(), 20);
        assert_eq!(filled(&r.train), (5..12).collect::<Vec<_>>());
        assert_eq!(filled(&r.test), (17..20).collect::<Vec<_>>());

        for i in 5..12 {
            assert_eq!(r.train[i], Some((i - 5) as f64));
        }
        assert_eq!(r.test[17], Some(100.0));
        assert_eq!(r.test[19], Some(102.0));

        let covered = (0..20)
            .filter(|&i| r.train[i].is_some() || r.test[i].is_some())
            .count();
        assert_eq!(20 - covered, 10);
    }

    #[test]
    fn test_segments_never_overlap_with_windowed_lengths() {
        for (n, l, train_len) in [(30, 3, 20), (101, 10, 65), (12, 1, 6)] {
            let train = vec![1.0; train_len - l];
            let test = vec![2.0; n - train_len - l];
            let r = reconcile(&train, &test, n, train_len, l).unwrap();
            for i in 0..n {
                assert!(!(r.train[i].is_some() && r.test[i].is_some()));
            }
            assert!(r.train[..l].iter().all(Option::is_none));
            assert!(r.test[train_len..train_len + l].iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_empty_predictions_give_all_none() {
        let r = reconcile(&[], &[], 4, 2, 1).unwrap();
        assert_eq!(r.train, vec![None; 4]);
        assert_eq!(r.test, vec![None; 4]);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let err = reconcile(&[1.0; 8], &[], 12, 10, 5).unwrap_err();
        assert_eq!(err, DataError::IndexOutOfRange { index: 12, len: 12 });

        assert!(reconcile(&[], &[1.0; 4], 20, 12, 5).is_err());
    }
}
