use thiserror::Error;
/// Raised by the decoder when a notification buffer cannot be split into whole records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("truncated packet: {len} bytes is not a multiple of the {record_size}-byte record")]
    TruncatedPacket { len: usize, record_size: usize },
}
#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error("consumer channel `{name}` is gone")]
    ChannelUnavailable { name: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for StreamError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        StreamError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for StreamError {
    fn from(value: image::ImageError) -> Self {
        StreamError::Plot(value.to_string())
    }
}
