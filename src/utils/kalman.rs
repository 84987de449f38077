use nalgebra::{SMatrix, SVector};

/// Constant-velocity Kalman filter over (cx, cy, area, aspect) box measurements
pub mod kalman_box;

pub const DT: u64 = 1;

macro_rules! pretty_print {
    ($arr:expr) => {{
        let indent = 4;
        let prefix = " ".repeat(indent);
        let mut result_els = vec!["".to_string()];
        for i in 0..$arr.nrows() {
            let mut row_els = vec![];
            for j in 0..$arr.ncols() {
                row_els.push(format!("{:12.3}", $arr[(i, j)]));
            }
            let row_str = row_els.into_iter().collect::<Vec<_>>().join(" ");
            let row_str = format!("{}{}", prefix, row_str);
            result_els.push(row_str);
        }
        result_els.into_iter().collect::<Vec<_>>().join("\n")
    }};
}

/// Belief of the filter: state mean and its covariance
///
#[derive(Debug, Clone, Copy)]
pub struct KalmanState<const X: usize> {
    pub mean: SVector<f32, X>,
    pub covariance: SMatrix<f32, X, X>,
}

impl<const X: usize> KalmanState<X> {
    pub fn new(mean: SVector<f32, X>, covariance: SMatrix<f32, X, X>) -> Self {
        Self { mean, covariance }
    }

    /// Writes mean and covariance to the trace log
    ///
    pub fn dump(&self) {
        log::trace!("Mean={}", pretty_print!(self.mean.transpose()));
        log::trace!("Covariance={}", pretty_print!(self.covariance));
    }

    /// True when no component of the mean or covariance is NaN or infinite
    ///
    pub fn is_finite(&self) -> bool {
        self.mean.iter().all(|v| v.is_finite()) && self.covariance.iter().all(|v| v.is_finite())
    }
}
