use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("each channel must have an equal amount of samples ({samples} samples for {channels} channels)")]
    InvalidInputShape { samples: usize, channels: usize },
    #[error("samples contains less data than specified ({available} of {requested} samples)")]
    InsufficientSamples { requested: usize, available: usize },
    #[error("initialization failed: {0}")]
    InitFailure(String),
    #[error("encoding error at frame {frame} (codec returned {code})")]
    EncodingFailure { frame: u64, code: i32 },
    #[error("encoder session has already been finalized")]
    SessionFinalized,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EncoderError {
    pub fn init_failure(reason: impl Into<String>) -> EncoderError {
        EncoderError::InitFailure(reason.into())
    }

    /// Whether the session can keep going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EncoderError::InvalidInputShape { .. } | EncoderError::InsufficientSamples { .. })
    }
}

pub type Result<T> = std::result::Result<T, EncoderError>;
