use crate::error::DataError;

/// A pure temporal cut of an ordered series: `train = items[..train_len]`,
/// `test = items[train_len..]`. No shuffling, no overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split<'a, T> {
    pub train: &'a [T],
    pub test: &'a [T],
}

impl<'a, T> Split<'a, T> {
    pub fn train_len(&self) -> usize {
        self.train.len()
    }
}

/// `train_len = floor(len * ratio)`.
///
/// The first `lookback` values of the test segment only ever serve as context, so test
/// predictions start at global index `train_len + lookback`.
pub fn split<T>(items: &[T], ratio: f64) -> Result<Split<'_, T>, DataError> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(DataError::InvalidSplitRatio(ratio));
    }

    let train_len = ((items.len() as f64) * ratio).floor() as usize;
    let (train, test) = items.split_at(train_len.min(items.len()));

    Ok(Split { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_scenario_lengths() {
        let values: Vec<usize> = (0..20).collect();
        let s = split(&values, 0.6).unwrap();
        assert_eq!(s.train_len(), 12);
        assert_eq!(s.train, &values[..12]);
        assert_eq!(s.test, &values[12..]);
        assert_eq!(s.test.len(), 8);
    }

    #[test]
    fn test_floor_not_round() {
        let values = [0u8; 10];
        // 10 * 0.65 = 6.5 -> 6
        assert_eq!(split(&values, 0.65).unwrap().train_len(), 6);
    }

    #[test]
    fn test_cut_preserves_order_and_covers_everything() {
        let values: Vec<i32> = (0..37).collect();
        let s = split(&values, 0.3).unwrap();
        let rejoined: Vec<i32> = s.train.iter().chain(s.test).copied().collect();
        assert_eq!(rejoined, values);
    }

    #[test]
    fn test_ratio_must_be_open_interval() {
        let values = [1.0; 4];
        for r in [0.0, 1.0, -0.1, 1.1, f64::NAN] {
            assert!(matches!(
                split(&values, r),
                Err(DataError::InvalidSplitRatio(_))
            ));
        }
    }
}
