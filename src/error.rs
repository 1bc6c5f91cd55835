use std::io;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = AssetError> = std::result::Result<T, E>;

/// Errors surfaced by the mesh decoder and the image codec.
///
/// Every variant is fatal to the call that raised it: decoding aborts at the
/// first offending record and the caller's target buffer is left untouched.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The file extension does not match any decoder branch.
    #[error("no decoder registered for file extension `{extension}`")]
    UnsupportedFormat { extension: String },

    /// The image is not the uncompressed 24-bit truecolor variant.
    #[error("unsupported image variant: image type {image_type}, {bits} bits per pixel")]
    UnsupportedImageVariant { image_type: u8, bits: u8 },

    /// A line or binary record does not parse into the expected shape.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Normal or UV indices cover a different number of face corners than
    /// position indices do.
    #[error("inconsistent {attribute} indexing: {actual} indices for {expected} face corners")]
    InconsistentAttributeIndexing {
        attribute: &'static str,
        actual: usize,
        expected: usize,
    },

    /// Image dimensions exceed the supported ceiling.
    #[error("image dimensions {width}x{height} exceed the supported maximum of {max}x{max}")]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    /// The image buffer holds no pixel data to write.
    #[error("image buffer holds no pixel data")]
    EmptyBuffer,

    /// The underlying byte stream could not be read or written.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The operation is declared but intentionally unimplemented.
    #[error("{feature} is not implemented")]
    NotImplemented { feature: &'static str },
}

impl AssetError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord(reason.into())
    }

    /// Malformed record with a 1-based source line attached.
    pub(crate) fn malformed_line(line: usize, reason: impl std::fmt::Display) -> Self {
        Self::MalformedRecord(format!("line {line}: {reason}"))
    }
}
