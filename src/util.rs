/// Index and value of the first maximum in `values`
///
/// Later entries replace the current best only when strictly greater, so exact
/// ties resolve to the earliest index. A NaN never becomes the maximum.
/// **Returns** `None` if `values` is empty.
pub fn first_argmax(values: impl IntoIterator<Item = f64>) -> Option<(usize, f64)> {
    values
        .into_iter()
        .enumerate()
        .fold(None, |best, (i, value)| match best {
            Some((_, best_value)) if value.is_nan() || value <= best_value => best,
            None if value.is_nan() => None,
            _ => Some((i, value)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_argmax_functional() {
        assert_eq!(first_argmax([1.0, 3.0, 2.0]), Some((1, 3.0)));
        assert_eq!(first_argmax([-1.0]), Some((0, -1.0)));
        assert_eq!(first_argmax(Vec::new()), None);
    }

    #[test]
    fn first_argmax_ties_prefer_first() {
        assert_eq!(first_argmax([2.0, 2.0]), Some((0, 2.0)));
        assert_eq!(first_argmax([0.0, 5.0, 5.0, 1.0]), Some((1, 5.0)));
    }

    #[test]
    fn first_argmax_skips_nan() {
        assert_eq!(first_argmax([f64::NAN, 1.0]), Some((1, 1.0)));
        assert_eq!(first_argmax([1.0, f64::NAN]), Some((0, 1.0)));
        assert_eq!(first_argmax([f64::NAN]), None);
    }
}
