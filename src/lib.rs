use thiserror::Error;

/// Tracker implementations (SORT session, batch processing, track ids)
pub mod trackers;

/// Geometry, Kalman filter and assignment primitives
pub mod utils;

/// Synthetic data generators for demos, tests and benchmarks
pub mod examples;

/// Commonly used types
pub mod prelude;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Errors {
    /// Bounding box passed to a tracker can't be used as a measurement
    ///
    #[error("Invalid input bounding box: {0}")]
    InvalidInput(String),

    /// Session or filter configured with out-of-range values
    ///
    #[error("Invalid tracker options: {0}")]
    InvalidOptions(String),

    /// Assignment solver received a NaN or infinite cost
    ///
    #[error("Assignment cost matrix contains a non-finite value at ({0}, {1})")]
    NonFiniteCost(usize, usize),

    /// Innovation covariance can't be factorized, the filter has diverged
    ///
    #[error("Innovation covariance is not positive definite.")]
    DegenerateInnovation,
}

pub(crate) const EPS: f32 = 0.00001;

/// Approximate equality for floating point structures
///
pub trait EstimateClose {
    fn almost_same(&self, other: &Self, eps: f32) -> bool;
}

impl EstimateClose for f32 {
    fn almost_same(&self, other: &Self, eps: f32) -> bool {
        (self - other).abs() < eps
    }
}
