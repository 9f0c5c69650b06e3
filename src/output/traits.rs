//! Output sink trait and error types
//!
//! A sink consumes items in emission order. It may write each item as it
//! arrives or hold them until `finish`.

use crate::item::Item;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize item: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Consumer of the crawl's item stream
pub trait ItemSink {
    /// Accepts the next emitted item
    fn accept(&mut self, item: &Item) -> OutputResult<()>;

    /// Flushes everything accepted so far
    ///
    /// Called once after the stream ends, including after cancellation, so
    /// partial results are never lost.
    fn finish(&mut self) -> OutputResult<()>;

    /// Number of items accepted so far
    fn accepted(&self) -> usize;
}
