use crate::float::Float;

struct Point<T: Float> {
    x: T,
    y: T,
}

/// Index of the bottom of the first dip of `arr[start..]` that falls strictly below
/// `threshold`: the first index under the threshold, followed downhill while the next
/// value is smaller.
pub fn first_dip_below<T: Float>(arr: &[T], start: usize, threshold: T) -> Option<usize> {
    let mut idx = (start..arr.len()).find(|&i| arr[i] < threshold)?;
    while idx + 1 < arr.len() && arr[idx + 1] < arr[idx] {
        idx += 1;
    }
    Some(idx)
}

/// Walk `radius` samples either side of `center` and return the index of the
/// smallest value. `center` is kept unless a strictly smaller value is found.
pub fn local_minimum<T: Float>(arr: &[T], center: usize, radius: usize) -> usize {
    let start = center.saturating_sub(radius);
    let end = (center + radius).min(arr.len() - 1);
    let mut min_idx = center;
    for i in start..=end {
        if arr[i] < arr[min_idx] {
            min_idx = i;
        }
    }
    min_idx
}

/// Refine the extremum at `idx` of `data` with a parabola through it and its two
/// neighbours. Returns the fractional position and the interpolated value. Extrema on
/// the edge of `data`, or with a flat neighbourhood, can't be fitted and are returned
/// unchanged.
pub fn correct_peak<T: Float>(idx: usize, data: &[T]) -> (T, T) {
    let uncorrected = (T::from_usize(idx).unwrap_or_else(T::zero), data[idx]);
    if idx == 0 || idx + 1 >= data.len() {
        return uncorrected;
    }
    let (left, center, right) = (data[idx - 1], data[idx], data[idx + 1]);
    if left + right - center - center == T::zero() {
        return uncorrected;
    }
    let point = quadratic_interpolation(
        Point {
            x: uncorrected.0 - T::one(),
            y: left,
        },
        Point {
            x: uncorrected.0,
            y: center,
        },
        Point {
            x: uncorrected.0 + T::one(),
            y: right,
        },
    );
    (point.x, point.y)
}

/// Vertex of the parabola through three equally spaced points. Works for
/// minima and maxima alike.
fn quadratic_interpolation<T: Float>(
    left: Point<T>,
    center: Point<T>,
    right: Point<T>,
) -> Point<T> {
    let half = T::from_f64(0.5).unwrap_or_else(T::zero);
    let quarter = T::from_f64(0.25).unwrap_or_else(T::zero);
    let two = T::one() + T::one();
    let shift = half * (right.y - left.y) / (two * center.y - left.y - right.y);
    let x = center.x + shift;
    let y = center.y + quarter * (right.y - left.y) * shift;
    Point { x, y }
}
