//! Ordered per-pixel branch selection
//!
//! Evaluates a list of `(condition, choice)` branches over whole arrays:
//! each output cell takes the choice of the first branch whose condition
//! holds there, or the fallback when none does. Conditions are boolean
//! masks built up front, so the per-pixel work is a short scan.

use ndarray::Array2;
use crate::maybe_rayon::*;
use radcal_core::{Error, Result};

/// Value taken by a branch: a scalar or a per-pixel array
#[derive(Debug, Clone)]
pub enum Choice {
    Constant(f64),
    Array(Array2<f64>),
}

impl Choice {
    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        match self {
            Choice::Constant(v) => *v,
            Choice::Array(a) => a[(row, col)],
        }
    }

    fn dim(&self) -> Option<(usize, usize)> {
        match self {
            Choice::Constant(_) => None,
            Choice::Array(a) => Some(a.dim()),
        }
    }
}

impl From<f64> for Choice {
    fn from(v: f64) -> Self {
        Choice::Constant(v)
    }
}

impl From<Array2<f64>> for Choice {
    fn from(a: Array2<f64>) -> Self {
        Choice::Array(a)
    }
}

/// One `(condition, choice)` pair
#[derive(Debug, Clone)]
pub struct Branch {
    pub condition: Array2<bool>,
    pub choice: Choice,
}

impl Branch {
    pub fn new(condition: Array2<bool>, choice: impl Into<Choice>) -> Self {
        Self {
            condition,
            choice: choice.into(),
        }
    }

    /// Branch whose condition is `predicate` applied to every cell of `values`
    pub fn when<F>(values: &Array2<f64>, predicate: F, choice: impl Into<Choice>) -> Self
    where
        F: Fn(f64) -> bool,
    {
        Self::new(values.mapv(predicate), choice)
    }
}

/// Pick, per cell, the choice of the first branch whose condition holds.
///
/// Cells matched by no branch take `fallback`.
///
/// # Errors
/// `ShapeMismatch` when a condition or array choice differs in shape from
/// `shape`.
///
/// # Example
/// ```ignore
/// // Clamp negatives to zero, keep everything else
/// let clipped = select(
///     values.dim(),
///     &[Branch::when(&values, |v| v < 0.0, 0.0)],
///     values.clone(),
/// )?;
/// ```
pub fn select(
    shape: (usize, usize),
    branches: &[Branch],
    fallback: impl Into<Choice>,
) -> Result<Array2<f64>> {
    let fallback = fallback.into();

    for branch in branches {
        if branch.condition.dim() != shape {
            return Err(Error::shape_mismatch(shape, branch.condition.dim()));
        }
    }
    for dim in branches
        .iter()
        .map(|b| &b.choice)
        .chain(std::iter::once(&fallback))
        .filter_map(Choice::dim)
    {
        if dim != shape {
            return Err(Error::shape_mismatch(shape, dim));
        }
    }

    let (rows, cols) = shape;
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                *out = branches
                    .iter()
                    .find(|b| b.condition[(row, col)])
                    .map_or_else(|| fallback.at(row, col), |b| b.choice.at(row, col));
            }
            row_data
        })
        .collect();

    Array2::from_shape_vec(shape, data).map_err(|e| Error::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_first_match_wins() {
        let values = array![[1.0, 5.0], [10.0, -3.0]];
        let result = select(
            values.dim(),
            &[
                Branch::when(&values, |v| v > 0.0, 1.0),
                Branch::when(&values, |v| v > 4.0, 2.0),
            ],
            -1.0,
        )
        .unwrap();

        // 5.0 and 10.0 satisfy both; the first branch decides
        assert_eq!(result, array![[1.0, 1.0], [1.0, -1.0]]);
    }

    #[test]
    fn test_array_choice_and_fallback() {
        let values = array![[0.5, -0.5], [2.0, f64::NAN]];
        let doubled = values.mapv(|v| v * 2.0);
        let result = select(
            values.dim(),
            &[Branch::when(&values, |v| v > 0.0, doubled)],
            f64::NAN,
        )
        .unwrap();

        assert_eq!(result[(0, 0)], 1.0);
        assert_eq!(result[(1, 0)], 4.0);
        assert!(result[(0, 1)].is_nan());
        assert!(result[(1, 1)].is_nan(), "NaN fails every comparison");
    }

    #[test]
    fn test_array_fallback() {
        let values = array![[3.0, -2.0]];
        let result = select(
            values.dim(),
            &[Branch::when(&values, |v| v < 0.0, 0.0)],
            values.clone(),
        )
        .unwrap();
        assert_eq!(result, array![[3.0, 0.0]]);
    }

    #[test]
    fn test_no_branches() {
        let result = select((2, 3), &[], 7.0).unwrap();
        assert!(result.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_shape_mismatch() {
        let mask = Array2::from_elem((2, 2), true);
        let err = select((3, 3), &[Branch::new(mask, 1.0)], 0.0).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));

        let mask = Array2::from_elem((3, 3), true);
        let err = select((3, 3), &[Branch::new(mask, Array2::zeros((1, 1)))], 0.0).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
