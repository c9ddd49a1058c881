//! Resolution of media elements to a single binary payload.

use std::{fs, sync::Arc};

use feat2arrow_core::{MediaKind, PixelBuffer, PixelLayout, Value};
use png::{BitDepth, ColorType, Encoder};

use crate::error::{ConvertError, MediaError};

/// Resolve one media element to its payload.
///
/// Accepted shapes are raw bytes, a file path string, a `{bytes, path}`
/// struct and, for images only, a decoded [`PixelBuffer`]. Empty bytes and
/// empty paths count as missing. Returns `Ok(None)` when nothing is left to
/// resolve.
///
/// Images prefer embedded bytes over the path; audio prefers the path.
pub fn resolve_media(value: &Value, kind: MediaKind) -> Result<Option<Arc<[u8]>>, ConvertError> {
    match value {
        Value::Null => Ok(None),
        // Empty payloads are treated as missing for audio too, not stored as-is.
        Value::Bytes(bytes) => Ok(non_empty(bytes)),
        Value::String(path) => read_path(path),
        Value::Image(pixels) => match kind {
            MediaKind::Image => Ok(Some(encode_png(pixels)?.into())),
            MediaKind::Audio => Err(unsupported(kind, value)),
        },
        Value::Audio(_) => match kind {
            MediaKind::Audio => Err(MediaError::DecodedAudio.into()),
            MediaKind::Image => Err(unsupported(kind, value)),
        },
        Value::Struct(_) => {
            let bytes = match value.get("bytes")? {
                Some(v) => v.try_bytes()?.and_then(non_empty),
                None => None,
            };
            let path = match value.get("path")? {
                Some(v) => v.try_str()?.filter(|p| !p.is_empty()),
                None => None,
            };
            match (kind, bytes, path) {
                (MediaKind::Image, Some(bytes), _) => Ok(Some(bytes)),
                (MediaKind::Audio, _, Some(path)) => read_path(path),
                (_, Some(bytes), None) => Ok(Some(bytes)),
                (_, None, Some(path)) => read_path(path),
                (_, None, None) => Ok(None),
            }
        }
        _ => Err(unsupported(kind, value)),
    }
}

/// Losslessly encode a decoded pixel buffer as PNG.
pub fn encode_png(pixels: &PixelBuffer) -> Result<Vec<u8>, MediaError> {
    let expected = pixels.expected_len();
    if expected != Some(pixels.data.len()) {
        return Err(MediaError::PixelBufferSize {
            width: pixels.width,
            height: pixels.height,
            layout: pixels.layout,
            expected,
            actual: pixels.data.len(),
        });
    }

    let mut buf = Vec::new();
    {
        let mut encoder = Encoder::new(&mut buf, pixels.width, pixels.height);
        encoder.set_color(match pixels.layout {
            PixelLayout::Gray => ColorType::Grayscale,
            PixelLayout::GrayAlpha => ColorType::GrayscaleAlpha,
            PixelLayout::Rgb => ColorType::Rgb,
            PixelLayout::Rgba => ColorType::Rgba,
        });
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixels.data)?;
        writer.finish()?;
    }
    Ok(buf)
}

fn non_empty(bytes: impl AsRef<[u8]>) -> Option<Arc<[u8]>> {
    let bytes = bytes.as_ref();
    (!bytes.is_empty()).then(|| Arc::from(bytes))
}

fn read_path(path: &str) -> Result<Option<Arc<[u8]>>, ConvertError> {
    if path.is_empty() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|source| MediaError::Read {
        path: path.to_string(),
        source,
    })?;
    Ok(Some(bytes.into()))
}

fn unsupported(kind: MediaKind, value: &Value) -> ConvertError {
    MediaError::Unsupported {
        kind,
        actual: value.variant_name(),
    }
    .into()
}
