/// True if every `x[i]` lies in `[lower[i], upper[i]]`, NaN never does
pub fn within_bounds(x: &[f64], lower: &[f64], upper: &[f64]) -> bool {
    assert_eq!(x.len(), lower.len());
    assert_eq!(x.len(), upper.len());
    x.iter()
        .zip(lower.iter().zip(upper))
        .all(|(x, (lower, upper))| lower <= x && x <= upper)
}
