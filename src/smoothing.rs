//! Savitzky-Golay smoothing used to soften spectra for presentation.
//!
//! The filter fits a least-squares polynomial to every window of samples. Edge
//! samples are taken from the polynomial fitted to the first and last full
//! window, so a polynomial of the filter order passes through unchanged.

use nalgebra::DMatrix;

use crate::errors::{InputError, ResponseError};

/// Default window length in samples.
pub const DEFAULT_WINDOW: usize = 51;
/// Default polynomial order.
pub const DEFAULT_ORDER: usize = 3;

/// Least-squares polynomial smoother over a fixed odd window.
#[derive(Clone, Debug, PartialEq)]
pub struct SavitzkyGolay {
    /// Odd window length in samples.
    window: usize,
    /// Order of the fitted polynomial.
    order: usize,
    /// Projection onto polynomials of `order` sampled at the window offsets.
    /// Row `r` evaluates the local fit at offset `r - window / 2`.
    projection: DMatrix<f64>,
}

impl SavitzkyGolay {
    /// Build a filter for `window` samples and polynomial `order`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidWindow`] when the window is even or not larger
    /// than the order.
    pub fn new(window: usize, order: usize) -> Result<Self, ResponseError> {
        let invalid = InputError::InvalidWindow { window, order };
        if window % 2 == 0 || window <= order {
            return Err(invalid.into());
        }

        let half = (window / 2) as f64;
        let vandermonde =
            DMatrix::from_fn(window, order + 1, |row, col| (row as f64 - half).powi(col as i32));
        let normal = vandermonde.transpose() * &vandermonde;
        let inverse = normal.cholesky().ok_or(invalid)?.inverse();
        let projection = &vandermonde * inverse * vandermonde.transpose();

        Ok(Self {
            window,
            order,
            projection,
        })
    }

    /// Window length in samples.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Polynomial order.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Smooth `samples`, returning a series of the same length.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::SeriesShorterThanWindow`] when `samples` has fewer
    /// entries than the window.
    pub fn smooth(&self, samples: &[f64]) -> Result<Vec<f64>, ResponseError> {
        let len = samples.len();
        if len < self.window {
            return Err(InputError::SeriesShorterThanWindow {
                len,
                window: self.window,
            }
            .into());
        }

        let half = self.window / 2;
        let fit = |row: usize, start: usize| -> f64 {
            self.projection
                .row(row)
                .iter()
                .zip(&samples[start..start + self.window])
                .map(|(weight, sample)| weight * sample)
                .sum()
        };

        let mut smoothed = Vec::with_capacity(len);
        smoothed.extend((0..half).map(|row| fit(row, 0)));
        smoothed.extend((half..len - half).map(|centre| fit(half, centre - half)));
        smoothed.extend((half + 1..self.window).map(|row| fit(row, len - self.window)));
        Ok(smoothed)
    }
}
