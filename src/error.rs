//! Errors reported before any pixel work starts

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid sphere: {0}")]
    InvalidSphere(String),

    #[error("Failed to start render workers: {0}")]
    Worker(String),

    #[error("Render worker has shut down")]
    WorkerGone,
}

impl RenderError {
    pub(crate) fn not_positive(name: &'static str, value: f64) -> Self {
        RenderError::InvalidParameter {
            name,
            value,
            reason: "must be a finite number greater than zero",
        }
    }
}
