//! Transport encoding for documents edited as text.
//!
//! Text saved through the editor is gzip-compressed before it is stored and
//! recorded with `Content-Encoding: gzip`; reading it back reverses that.
//! Uploaded files never pass through here.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;

/// Content-encoding recorded with every object written through [`encode`].
pub const GZIP_ENCODING: &str = "gzip";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to compress document: {0}")]
    Encode(#[source] io::Error),

    #[error("document is not a valid gzip stream: {0}")]
    CorruptData(String),
}

pub fn encode(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input).map_err(CodecError::Encode)?;
    encoder.finish().map_err(CodecError::Encode)
}

pub fn decode(compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
    // An empty body is not a gzip stream, even though some decoders accept it.
    if compressed.is_empty() {
        return Err(CodecError::CorruptData("empty input".to_string()));
    }
    let mut decoder = GzDecoder::new(compressed);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|err| CodecError::CorruptData(err.to_string()))?;
    Ok(out)
}
