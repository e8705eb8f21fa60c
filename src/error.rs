// One error type for the whole crate.
// Every variant states *where* things went wrong.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Decoding a cover/reveal image from disk failed.
    #[error("Image load error ({path}): {reason}")]
    ImageLoad { path: String, reason: String },

    /// An image never became ready within the load deadline.
    #[error("Image load timed out after {millis} ms: {what}")]
    LoadTimeout { what: String, millis: u64 },

    /// An image reported zero width or height, so nothing can be laid out.
    #[error("Image has no pixels: {0}")]
    EmptyImage(String),

    /// The scratch bitmap refused a pixel read.
    #[error("Pixel read refused: {0}")]
    PixelRead(String),

    /// The payment amount is not a finite, non-negative number.
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    /// Handing a URI to the OS failed.
    #[error("Navigation to {uri} failed: {reason}")]
    Navigation { uri: String, reason: String },

    /// Reading or writing the session file failed.
    #[error("Session store error ({path}): {reason}")]
    Session { path: String, reason: String },

    /// Creating the window failed.
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed.
    #[error("Window update error: {0}")]
    WindowUpdate(String),
}
