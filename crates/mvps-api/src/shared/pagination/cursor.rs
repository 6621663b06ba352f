//! Opaque cursor tokens
//!
//! A cursor is the Base64 form of the decimal row key. Decoding is total:
//! anything that does not round-trip to a key means "no cursor".

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

use super::RowKey;

/// Standard alphabet, padded on encode, padding optional on decode.
const CURSOR_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode a row key into a cursor token. `None` stays `None`.
pub fn encode_cursor(key: Option<RowKey>) -> Option<String> {
    key.map(|k| CURSOR_ENGINE.encode(k.to_string()))
}

/// Decode a cursor token back into a row key.
///
/// Blank, non-Base64, non-UTF-8 and non-numeric tokens all yield `None`.
pub fn decode_cursor(token: Option<&str>) -> Option<RowKey> {
    let token = token?;
    if token.trim().is_empty() {
        return None;
    }

    let bytes = CURSOR_ENGINE.decode(token).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.parse::<RowKey>().ok()
}
