//! Grabber error types.

/// Errors raised by [`MediaGrabber`](crate::MediaGrabber).
///
/// Location never fails; these cover caller contract violations and output.
#[derive(Debug, thiserror::Error)]
pub enum GrabberError {
    /// Neither the config nor the site provides a maximum width.
    #[error("No maximum width: set max_width or the site content width")]
    MissingWidth,
    /// Writing rendered media to the output failed.
    #[error("Failed to write media: {0}")]
    Io(#[from] std::io::Error),
}
