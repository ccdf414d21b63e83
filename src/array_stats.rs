//! Small array helpers shared by the corpus, the statistic and the line search

use itertools::{Itertools, MinMaxResult};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis, Zip};
use ndarray_stats::QuantileExt;

/// Index of the element with the largest absolute value, the first one on ties
pub fn argmax_abs(arr: ArrayView1<f64>) -> Option<usize> {
    if arr.is_empty() {
        return None;
    }

    let (idx, _) = arr
        .iter()
        .enumerate()
        .fold((0, arr[0].abs()), |(max_idx, max_val), (idx, &val)| {
            if val.abs() > max_val {
                (idx, val.abs())
            } else {
                (max_idx, max_val)
            }
        });

    Some(idx)
}

/// Per-column flag telling whether the column takes more than one distinct value
pub fn informative_columns(m: ArrayView2<f64>) -> Vec<bool> {
    m.axis_iter(Axis(1))
        .map(|column| match column.iter().minmax() {
            MinMaxResult::MinMax(min, max) => min != max,
            MinMaxResult::OneElement(_) | MinMaxResult::NoElements => false,
        })
        .collect()
}

/// Largest value of the array, `None` for an empty one or one holding NaN
pub fn max_value(arr: ArrayView1<f64>) -> Option<f64> {
    arr.max().ok().copied()
}

/// Difference between the running sums of two equally sized arrays
pub fn cumulative_difference(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Array1<f64> {
    let mut diff = Array1::zeros(a.len());
    let mut acc = 0.0;
    Zip::from(&mut diff)
        .and(a)
        .and(b)
        .for_each(|d, &x, &y| {
            acc += x - y;
            *d = acc;
        });
    diff
}
