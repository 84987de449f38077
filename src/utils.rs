/// Bounding boxes
pub mod bbox;

/// Kalman filter
pub mod kalman;

/// Optimal assignment (Hungarian) over rectangular cost matrices
pub mod linear_sum_assignment;
