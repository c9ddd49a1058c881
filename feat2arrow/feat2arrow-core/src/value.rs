//! Row-level record representation consumed by the materializer.
//!
//! A record is a [`Value::Struct`] mirroring the dataset's feature tree. Struct
//! entries are keyed, so a missing key ("absent") and a key holding
//! [`Value::Null`] ("present but null") stay distinguishable.

use std::sync::Arc;

use crate::error::ValueTypeError;

/// Channel layout of an 8-bit [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl PixelLayout {
    pub fn channels(&self) -> usize {
        match self {
            PixelLayout::Gray => 1,
            PixelLayout::GrayAlpha => 2,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

/// Decoded in-memory image: row-major, 8 bits per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: Arc<[u8]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            layout,
            data: data.into(),
        }
    }

    /// Number of bytes `data` must hold for the declared dimensions, or
    /// `None` when that size does not fit in `usize`.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.layout.channels())
    }
}

/// Decoded in-memory audio samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSamples {
    pub sampling_rate: u32,
    pub samples: Arc<[f32]>,
}

/// Value of one record, or of one node inside a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(Arc<str>),
    Bytes(Arc<[u8]>),
    List(Vec<Value>),
    Struct(Vec<(Arc<str>, Value)>),
    Image(PixelBuffer),
    Audio(AudioSamples),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    pub fn bytes(b: impl AsRef<[u8]>) -> Self {
        Self::Bytes(Arc::from(b.as_ref()))
    }

    /// Build a struct value from `(key, value)` pairs, keeping their order.
    pub fn structure<K, I>(entries: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Struct(
            entries
                .into_iter()
                .map(|(k, v)| (Arc::from(k.as_ref()), v))
                .collect(),
        )
    }

    /// Media reference holding an embedded payload, as stored by columnar
    /// sources (`{bytes, path}`).
    pub fn media_bytes(b: impl AsRef<[u8]>) -> Self {
        Self::structure([("bytes", Value::bytes(b)), ("path", Value::Null)])
    }

    /// Media reference pointing at a file on disk.
    pub fn media_path(path: impl AsRef<str>) -> Self {
        Self::structure([("bytes", Value::Null), ("path", Value::string(path))])
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a struct entry.
    ///
    /// Returns `Ok(None)` when the key is absent or when `self` is itself
    /// `Null` (an absent parent has no children), `Ok(Some(&Value::Null))`
    /// when the key is present but null.
    pub fn get(&self, key: &str) -> Result<Option<&Value>, ValueTypeError> {
        match self {
            Value::Struct(entries) => Ok(entries
                .iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, v)| v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Struct")),
        }
    }

    pub fn try_bool(&self) -> Result<Option<bool>, ValueTypeError> {
        match self {
            Value::Bool(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Bool")),
        }
    }

    pub fn try_i8(&self) -> Result<Option<i8>, ValueTypeError> {
        self.try_integer("I8")
    }

    pub fn try_i16(&self) -> Result<Option<i16>, ValueTypeError> {
        self.try_integer("I16")
    }

    pub fn try_i32(&self) -> Result<Option<i32>, ValueTypeError> {
        self.try_integer("I32")
    }

    pub fn try_i64(&self) -> Result<Option<i64>, ValueTypeError> {
        self.try_integer("I64")
    }

    pub fn try_u8(&self) -> Result<Option<u8>, ValueTypeError> {
        self.try_integer("U8")
    }

    pub fn try_u16(&self) -> Result<Option<u16>, ValueTypeError> {
        self.try_integer("U16")
    }

    pub fn try_u32(&self) -> Result<Option<u32>, ValueTypeError> {
        self.try_integer("U32")
    }

    pub fn try_u64(&self) -> Result<Option<u64>, ValueTypeError> {
        self.try_integer("U64")
    }

    pub fn try_f32(&self) -> Result<Option<f32>, ValueTypeError> {
        match self {
            Value::F32(v) => Ok(Some(*v)),
            Value::F64(v) => Ok(Some(*v as f32)),
            Value::Null => Ok(None),
            _ => match self.as_i128() {
                Some(v) => Ok(Some(v as f32)),
                None => Err(self.type_mismatch("F32")),
            },
        }
    }

    pub fn try_f64(&self) -> Result<Option<f64>, ValueTypeError> {
        match self {
            Value::F32(v) => Ok(Some(f64::from(*v))),
            Value::F64(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => match self.as_i128() {
                Some(v) => Ok(Some(v as f64)),
                None => Err(self.type_mismatch("F64")),
            },
        }
    }

    pub fn try_str(&self) -> Result<Option<&str>, ValueTypeError> {
        match self {
            Value::String(v) => Ok(Some(v.as_ref())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("String")),
        }
    }

    pub fn try_bytes(&self) -> Result<Option<&[u8]>, ValueTypeError> {
        match self {
            Value::Bytes(v) => Ok(Some(v.as_ref())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Bytes")),
        }
    }

    /// Widen any integer variant; `None` for everything else.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match self {
            Value::I8(v) => i128::from(*v),
            Value::I16(v) => i128::from(*v),
            Value::I32(v) => i128::from(*v),
            Value::I64(v) => i128::from(*v),
            Value::U8(v) => i128::from(*v),
            Value::U16(v) => i128::from(*v),
            Value::U32(v) => i128::from(*v),
            Value::U64(v) => i128::from(*v),
            _ => return None,
        })
    }

    /// Integer of any width, narrowed to `T` when it fits.
    fn try_integer<T: TryFrom<i128>>(&self, expected: &str) -> Result<Option<T>, ValueTypeError> {
        if self.is_null() {
            return Ok(None);
        }
        let wide = self.as_i128().ok_or_else(|| self.type_mismatch(expected))?;
        T::try_from(wide)
            .map(Some)
            .map_err(|_| ValueTypeError::new(expected, format!("{}({wide})", self.variant_name())))
    }

    pub fn type_mismatch(&self, expected: impl Into<String>) -> ValueTypeError {
        ValueTypeError::new(expected, self.variant_name())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I8(_) => "I8",
            Value::I16(_) => "I16",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::U8(_) => "U8",
            Value::U16(_) => "U16",
            Value::U32(_) => "U32",
            Value::U64(_) => "U64",
            Value::F32(_) => "F32",
            Value::F64(_) => "F64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
            Value::Struct(_) => "Struct",
            Value::Image(_) => "Image",
            Value::Audio(_) => "Audio",
        }
    }
}
