//! URL parameter helpers and types.

use std::{fmt::Display, str::FromStr};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Any serializable state as one URL path segment: CBOR, then URL-safe base64.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UrlParam<T>(pub T);

impl<T> From<T> for UrlParam<T> {
    fn from(value: T) -> Self {
        UrlParam(value)
    }
}

/// Renders the parameter `FromStr` parses back. State CBOR cannot encode
/// renders as an empty segment, which fails to parse, and readers fall back
/// to their default state, so a bad share link never breaks the page.
impl<T: Serialize> Display for UrlParam<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut serialized = Vec::new();
        if ciborium::into_writer(&self.0, &mut serialized).is_ok() {
            write!(f, "{}", URL_SAFE.encode(serialized))?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StateParseError {
    #[error("Failed to decode base64: {0}")]
    DecodeError(#[from] base64::DecodeError),
    #[error("Failed to deserialize: {0}")]
    CiboriumError(ciborium::de::Error<std::io::Error>),
}

// Parse the state from a string that was created by Display
impl<T: for<'de> Deserialize<'de>> FromStr for UrlParam<T> {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = URL_SAFE.decode(s.as_bytes())?;
        let parsed = ciborium::from_reader(std::io::Cursor::new(decoded))
            .map_err(StateParseError::CiboriumError)?;
        Ok(UrlParam(parsed))
    }
}
