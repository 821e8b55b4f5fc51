use crate::data_structs::CountMatrix;

/// Checks that `data` looks like count data: every stored value is
/// non-negative and has no fractional part.
///
/// Implicit zeros of sparse matrices are not scanned. NaN and infinite values
/// are rejected. An empty matrix is valid.
pub fn check_nonnegative_integers(data: &CountMatrix) -> bool {
    all_nonnegative_integers(data.values())
}

/// [`check_nonnegative_integers`] over any sequence of values.
pub fn all_nonnegative_integers<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a f64>, {
    values
        .into_iter()
        .all(|&value| value >= 0.0 && value.fract() == 0.0)
}
