// Constant-velocity model as in the SORT paper:
// https://arxiv.org/abs/1602.00763
//
use crate::utils::bbox::StateBox;
use crate::utils::kalman::{KalmanState, DT};
use crate::Errors;
use anyhow::Result;
use nalgebra::{SMatrix, SVector};

/// Measured components: center x, center y, area, aspect
pub const DIM_SORT_BOX: usize = 4;
/// Measured components plus velocities of center x, center y and area
pub const DIM_SORT_BOX_STATE: usize = 7;

/// Noise and initial uncertainty of the box filter. Every value is a diagonal
/// element of the corresponding covariance matrix.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanBoxOptions {
    /// Uncertainty of (cx, cy, area, aspect) measurements
    pub measurement_noise: [f32; DIM_SORT_BOX],
    /// Uncertainty of (cx, cy, area, aspect, vcx, vcy, varea) during one transition
    pub process_noise: [f32; DIM_SORT_BOX_STATE],
    /// Uncertainty of the state right after the first observation; velocities are unobserved
    pub initial_covariance: [f32; DIM_SORT_BOX_STATE],
}

impl Default for KalmanBoxOptions {
    fn default() -> Self {
        Self {
            measurement_noise: [1.0, 1.0, 10.0, 10.0],
            process_noise: [1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 0.0001],
            initial_covariance: [10.0, 10.0, 10.0, 10.0, 10000.0, 10000.0, 10000.0],
        }
    }
}

impl KalmanBoxOptions {
    pub fn new(
        measurement_noise: [f32; DIM_SORT_BOX],
        process_noise: [f32; DIM_SORT_BOX_STATE],
        initial_covariance: [f32; DIM_SORT_BOX_STATE],
    ) -> Self {
        Self {
            measurement_noise,
            process_noise,
            initial_covariance,
        }
    }

    /// All variances must be positive and finite
    ///
    pub fn validate(&self) -> Result<()> {
        let all = self
            .measurement_noise
            .iter()
            .chain(self.process_noise.iter())
            .chain(self.initial_covariance.iter());
        for v in all {
            if !(v.is_finite() && *v > 0.0) {
                return Err(Errors::InvalidOptions(format!(
                    "kalman variances must be positive and finite, got {}",
                    v
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Kalman filter
///
#[derive(Debug, Clone)]
pub struct SortBoxKalmanFilter {
    motion_matrix: SMatrix<f32, DIM_SORT_BOX_STATE, DIM_SORT_BOX_STATE>,
    update_matrix: SMatrix<f32, DIM_SORT_BOX, DIM_SORT_BOX_STATE>,
    measurement_cov: SMatrix<f32, DIM_SORT_BOX, DIM_SORT_BOX>,
    process_cov: SMatrix<f32, DIM_SORT_BOX_STATE, DIM_SORT_BOX_STATE>,
    initial_cov: SMatrix<f32, DIM_SORT_BOX_STATE, DIM_SORT_BOX_STATE>,
}

/// Default initializer
impl Default for SortBoxKalmanFilter {
    fn default() -> Self {
        SortBoxKalmanFilter::new(&KalmanBoxOptions::default())
    }
}

impl SortBoxKalmanFilter {
    pub fn new(opts: &KalmanBoxOptions) -> Self {
        let mut motion_matrix: SMatrix<f32, DIM_SORT_BOX_STATE, DIM_SORT_BOX_STATE> =
            SMatrix::identity();

        // aspect has no velocity term
        for i in 0..DIM_SORT_BOX_STATE - DIM_SORT_BOX {
            motion_matrix[(i, DIM_SORT_BOX + i)] = DT as f32;
        }

        SortBoxKalmanFilter {
            motion_matrix,
            update_matrix: SMatrix::identity(),
            measurement_cov: SMatrix::from_diagonal(&SVector::from_iterator(
                opts.measurement_noise,
            )),
            process_cov: SMatrix::from_diagonal(&SVector::from_iterator(opts.process_noise)),
            initial_cov: SMatrix::from_diagonal(&SVector::from_iterator(opts.initial_covariance)),
        }
    }

    /// Initialize the filter with the first observation, velocities start at zero
    ///
    pub fn initiate(&self, bbox: &StateBox) -> KalmanState<DIM_SORT_BOX_STATE> {
        let mean: SVector<f32, DIM_SORT_BOX_STATE> = SVector::from_iterator(
            bbox.as_array()
                .into_iter()
                .chain([0.0; DIM_SORT_BOX_STATE - DIM_SORT_BOX]),
        );
        KalmanState {
            mean,
            covariance: self.initial_cov,
        }
    }

    /// Advances the state one time step
    ///
    pub fn predict(
        &self,
        state: &KalmanState<DIM_SORT_BOX_STATE>,
    ) -> KalmanState<DIM_SORT_BOX_STATE> {
        let mean = self.motion_matrix * state.mean;
        let covariance =
            self.motion_matrix * state.covariance * self.motion_matrix.transpose()
                + self.process_cov;
        KalmanState { mean, covariance }
    }

    /// Projects the state into the measurement space
    ///
    pub fn project(&self, state: &KalmanState<DIM_SORT_BOX_STATE>) -> KalmanState<DIM_SORT_BOX> {
        let mean = self.update_matrix * state.mean;
        let covariance = self.update_matrix * state.covariance * self.update_matrix.transpose()
            + self.measurement_cov;
        KalmanState { mean, covariance }
    }

    /// Corrects the state with the current observation
    ///
    pub fn update(
        &self,
        state: &KalmanState<DIM_SORT_BOX_STATE>,
        measurement: &StateBox,
    ) -> Result<KalmanState<DIM_SORT_BOX_STATE>> {
        let projected = self.project(state);
        let cholesky = projected
            .covariance
            .cholesky()
            .ok_or(Errors::DegenerateInnovation)?;

        // K = P * H^T * S^-1; both P and S are symmetric, so K^T = S^-1 * (H * P)
        let kalman_gain = cholesky
            .solve(&(self.update_matrix * state.covariance))
            .transpose();

        let innovation =
            SVector::<f32, DIM_SORT_BOX>::from_iterator(measurement.as_array()) - projected.mean;

        let mean = state.mean + kalman_gain * innovation;

        // Joseph form keeps the covariance symmetric and positive definite
        let ikh = SMatrix::<f32, DIM_SORT_BOX_STATE, DIM_SORT_BOX_STATE>::identity()
            - kalman_gain * self.update_matrix;
        let covariance = ikh * state.covariance * ikh.transpose()
            + kalman_gain * self.measurement_cov * kalman_gain.transpose();

        Ok(KalmanState { mean, covariance })
    }
}

/// Box held by the position/shape part of the state
///
impl From<&KalmanState<DIM_SORT_BOX_STATE>> for StateBox {
    fn from(state: &KalmanState<DIM_SORT_BOX_STATE>) -> Self {
        StateBox::new(state.mean[0], state.mean[1], state.mean[2], state.mean[3])
    }
}
