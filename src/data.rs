use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{OrdinalError, Result};

/// Covariate rows paired with observed class indices in `[0, n_classes)`.
#[derive(Debug, Clone)]
pub struct OrdinalData {
    x: Array2<f64>,
    y: Array1<usize>,
    n_classes: usize,
}

impl OrdinalData {
    pub fn new(x: Array2<f64>, y: Array1<usize>, n_classes: usize) -> Result<Self> {
        if n_classes < 2 {
            return Err(OrdinalError::InvalidClassCount { n_classes });
        }
        if x.nrows() != y.len() {
            return Err(OrdinalError::DimensionMismatch {
                what: "observed classes",
                expected: x.nrows(),
                got: y.len(),
            });
        }
        if let Some((row, &class)) = y.iter().enumerate().find(|(_, c)| **c >= n_classes) {
            return Err(OrdinalError::ClassOutOfRange {
                row,
                class,
                n_classes,
            });
        }
        Ok(Self { x, y, n_classes })
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<usize> {
        &self.y
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.x.row(i)
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_obs(&self) -> usize {
        self.y.len()
    }

    pub fn n_covariates(&self) -> usize {
        self.x.ncols()
    }

    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &k in &self.y {
            counts[k] += 1;
        }
        counts
    }
}
