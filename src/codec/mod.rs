//! Block codec support for container files
//!
//! Container blocks may in principle be compressed. Only the `null`
//! (passthrough) codec is supported; any other name is rejected.

use bytes::Bytes;

use crate::error::CodecError;

/// Codec used within container blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// No compression (passthrough)
    #[default]
    Null,
}

impl Codec {
    /// Parse a codec from its name string as found in container metadata.
    ///
    /// # Examples
    /// ```
    /// use avrolite::codec::Codec;
    ///
    /// let codec = Codec::from_name("null").unwrap();
    /// assert_eq!(codec, Codec::Null);
    ///
    /// let err = Codec::from_name("deflate").unwrap_err();
    /// assert!(err.to_string().contains("deflate"));
    /// ```
    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        match name {
            "null" => Ok(Codec::Null),
            unknown => Err(CodecError::UnsupportedCodec(format!(
                "codec '{}' is not supported. Supported codecs: null",
                unknown
            ))),
        }
    }

    /// Get the name of this codec as it appears in the `avro.codec` entry.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Null => "null",
        }
    }

    /// Encode a block payload.
    pub fn compress(&self, data: Bytes) -> Result<Bytes, CodecError> {
        match self {
            Codec::Null => Ok(data),
        }
    }

    /// Decode a block payload.
    pub fn decompress(&self, data: Bytes) -> Result<Bytes, CodecError> {
        match self {
            Codec::Null => Ok(data),
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
