//! Numeric helpers shared by alignment and metrics.

/// Median of `values`, averaging the two middle elements for even counts.
///
/// Reorders `values` in place. Returns `None` for an empty slice.
pub(crate) fn median_in_place(values: &mut [f32]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    let upper = f64::from(*upper);
    if n % 2 == 1 {
        return Some(upper);
    }
    // The lower half holds the element just below the midpoint as its maximum.
    let below = lower
        .iter()
        .copied()
        .max_by(f32::total_cmp)
        .map(f64::from)?;
    Some(0.5 * (below + upper))
}

/// Minimum and maximum of `values`, ignoring NaN. `None` when nothing remains.
pub(crate) fn min_max<I>(values: I) -> Option<(f32, f32)>
where
    I: IntoIterator<Item = f32>,
{
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::{median_in_place, min_max};

    #[test]
    fn median_of_odd_count_is_middle_value() {
        let mut values = [5.0f32, 1.0, 3.0];
        assert_eq!(median_in_place(&mut values), Some(3.0));
    }

    #[test]
    fn median_of_even_count_averages_middle_pair() {
        let mut values = [4.0f32, 1.0, 3.0, 2.0];
        assert_eq!(median_in_place(&mut values), Some(2.5));
    }

    #[test]
    fn median_of_empty_slice_is_none() {
        let mut values: [f32; 0] = [];
        assert_eq!(median_in_place(&mut values), None);
    }

    #[test]
    fn min_max_skips_nan() {
        let range = min_max([3.0f32, f32::NAN, -1.0, 7.5]);
        assert_eq!(range, Some((-1.0, 7.5)));
        assert_eq!(min_max(std::iter::empty()), None);
    }
}
