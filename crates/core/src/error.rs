/// Result alias that carries the custom [`VisualizerError`] type.
pub type Result<T> = std::result::Result<T, VisualizerError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum VisualizerError {
    /// Runtime misuse with no structured payload, such as capturing on a
    /// recorder that was never started or a gradient that failed to build.
    #[error("{0}")]
    Message(String),
    /// Filesystem failure while loading options or writing frames.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Options file could not be parsed.
    #[error("invalid options document: {0}")]
    Json(#[from] serde_json::Error),
    /// A captured frame could not be encoded or saved.
    #[error("frame encoding failed: {0}")]
    Image(#[from] image::ImageError),
    /// The spectral transform rejected its buffers.
    #[error("fft failed: {0}")]
    Fft(#[from] realfft::FftError),
    /// A configuration value was outside its accepted range.
    #[error("invalid `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    /// A literal color could not be parsed.
    #[error("invalid color `{value}`: {reason}")]
    InvalidColor { value: String, reason: String },
    /// A shared lock was poisoned by a panicking holder.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
    /// The frame driver task ended abnormally.
    #[error("frame driver failed: {0}")]
    Driver(String),
}

impl VisualizerError {
    /// Wraps a plain description in [`VisualizerError::Message`].
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_input() {
        let err = VisualizerError::invalid_config("fftSize", "must be a power of two");
        assert_eq!(err.to_string(), "invalid `fftSize`: must be a power of two");

        let err = VisualizerError::msg("recorder has not been started");
        assert!(matches!(err, VisualizerError::Message(_)));
        assert_eq!(err.to_string(), "recorder has not been started");
    }

    #[test]
    fn io_failures_convert_through_question_mark() {
        fn open_missing() -> Result<()> {
            std::fs::File::open("/definitely/not/here.json")?;
            Ok(())
        }

        assert!(matches!(open_missing(), Err(VisualizerError::Io(_))));
    }
}
