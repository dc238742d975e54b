//! Error types for the media runtime.
//!
//! Player and widget operations never fail towards their callers; these
//! errors only surface inside the rodio-backed handle, where they are logged,
//! and at startup when no output device can be opened.

use std::path::PathBuf;

/// Failure to open, decode or output a media source.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("no audio output device: {0}")]
    Output(#[from] rodio::StreamError),
}
