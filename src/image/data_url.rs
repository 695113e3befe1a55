//! Helpers for base64 data URLs (`data:<mime>;base64,<payload>`).
//!
//! Everything here is pure string and byte manipulation, independent of any
//! network code.

use crate::error::{Result, VisionError};
use crate::image::types::ImageFormat;
use base64::Engine;

const SCHEME: &str = "data:";

/// Base64 characters covering the 12 magic bytes format sniffing reads.
const MAGIC_PREFIX_CHARS: usize = 16;

/// Returns the payload of a data URL, or the input unchanged if it has no
/// `data:` header.
///
/// Total and idempotent: the payload of a data URL never starts with `data:`.
pub fn strip_prefix(input: &str) -> &str {
    match input.split_once(',') {
        Some((header, payload)) if header.starts_with(SCHEME) => payload,
        _ => input,
    }
}

/// Returns the MIME type declared in a data URL header, if any.
pub fn mime_type(input: &str) -> Option<&str> {
    let (header, _) = input.split_once(',')?;
    let media = header.strip_prefix(SCHEME)?;
    let mime = media.split(';').next().unwrap_or_default().trim();
    (!mime.is_empty()).then_some(mime)
}

/// Builds a base64 data URL from a MIME type and an encoded payload.
pub fn to_data_url(mime: &str, payload: &str) -> String {
    format!("{SCHEME}{mime};base64,{payload}")
}

/// Wraps an encoded payload as a PNG data URL.
pub fn png_data_url(payload: &str) -> String {
    to_data_url(ImageFormat::Png.mime_type(), payload)
}

/// Encodes raw image bytes as a data URL.
pub fn encode(data: &[u8], format: ImageFormat) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(data);
    to_data_url(format.mime_type(), &payload)
}

/// Decodes a data URL or bare base64 payload.
///
/// Tolerates embedded whitespace and missing padding, which uploads and
/// pasted strings often carry.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = strip_prefix(input)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(cleaned.trim_end_matches('='))
        .map_err(|e| VisionError::Decode(e.to_string()))
}

/// Picks the format of an encoded image.
///
/// A recognised MIME type in the header wins; otherwise the decoded magic
/// bytes decide; otherwise PNG.
pub fn detect_format(input: &str) -> ImageFormat {
    mime_type(input)
        .and_then(ImageFormat::from_mime_type)
        .or_else(|| sniff_format(input))
        .unwrap_or_default()
}

/// MIME type to send alongside an encoded image.
///
/// Any declared MIME type is kept as is, including ones [`ImageFormat`] does
/// not model; a bare payload falls back to [`detect_format`].
pub fn detect_mime_type(input: &str) -> String {
    match mime_type(input) {
        Some(mime) => mime.to_string(),
        None => detect_format(input).mime_type().to_string(),
    }
}

/// Decodes only the leading characters of the payload.
fn sniff_format(input: &str) -> Option<ImageFormat> {
    let head: String = strip_prefix(input)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .take(MAGIC_PREFIX_CHARS)
        .collect();
    let data = decode(&head).ok()?;
    ImageFormat::from_magic_bytes(&data)
}
