use std::cmp::Ordering;

use crate::float::Float;

/// Median of `values`. For an even number of values the upper of the two middle
/// values is returned. `NaN`s sort as equal to everything, so callers should keep
/// them out of the window.
pub fn median<T: Float>(values: &[T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(sorted[sorted.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_median() {
        assert_eq!(median(&[100., 100., 100., 101., 100.]), Some(100.));
        assert_eq!(median(&[3., 1., 2.]), Some(2.));
    }

    #[test]
    fn even_median_takes_upper_middle() {
        assert_eq!(median(&[4., 1., 3., 2.]), Some(3.));
    }

    #[test]
    fn empty_median() {
        assert_eq!(median::<f32>(&[]), None);
    }
}
