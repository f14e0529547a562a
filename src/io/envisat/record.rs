//! Decoding of binary annotation records through a [`RecordLayout`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ProductError;
use super::layout::{Field, FieldKind, Item, RecordLayout};
use super::time::{MJD_SIZE, decode_mjd2000};

/// Value of one decoded field or group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Time(Option<DateTime<Utc>>),
    Flag(bool),
    Int(i64),
    Float(f64),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Struct(Fields),
}

impl FieldValue {
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Time(t) => *t,
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            FieldValue::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            FieldValue::Ints(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Fields> {
        match self {
            FieldValue::Struct(f) => Some(f),
            _ => None,
        }
    }
}

/// Decoded record, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn time(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name).and_then(FieldValue::as_time)
    }

    pub fn floats(&self, name: &str) -> Option<&[f64]> {
        self.get(name).and_then(FieldValue::as_floats)
    }

    pub fn ints(&self, name: &str) -> Option<&[i64]> {
        self.get(name).and_then(FieldValue::as_ints)
    }
}

/// Decode one record. `buf` may be longer than the layout (extended records);
/// a shorter buffer is rejected.
pub fn decode(layout: &RecordLayout, buf: &[u8]) -> Result<Fields, ProductError> {
    if buf.len() < layout.size {
        return Err(ProductError::Truncated {
            what: format!("{} record", layout.name),
            needed: layout.size as u64,
            available: buf.len() as u64,
        });
    }

    let mut fields = Fields::new();
    for item in layout.items {
        match item {
            Item::Field(field) => {
                fields.insert(field.name, decode_field(field, buf, 0));
            }
            Item::Group(group) => {
                let mut entry = Fields::new();
                for field in group.fields {
                    entry.insert(field.name, decode_field(field, buf, group.offset));
                }
                fields.insert(group.name, FieldValue::Struct(entry));
            }
        }
    }
    Ok(fields)
}

fn decode_field(field: &Field, buf: &[u8], base: usize) -> FieldValue {
    let start = base + field.offset;
    let size = field.kind.size();

    let value_at = |i: usize| -> Scalar {
        let bytes = &buf[start + i * size..start + (i + 1) * size];
        read_scalar(field.kind, bytes)
    };

    if field.count == 1 {
        return value_at(0).into_value();
    }

    match field.kind {
        FieldKind::Float32 => FieldValue::Floats(
            (0..field.count)
                .map(|i| match value_at(i) {
                    Scalar::Float(v) => v,
                    _ => 0.0,
                })
                .collect(),
        ),
        _ => FieldValue::Ints(
            (0..field.count)
                .map(|i| match value_at(i) {
                    Scalar::Int(v) => v,
                    Scalar::Flag(b) => i64::from(b),
                    _ => 0,
                })
                .collect(),
        ),
    }
}

enum Scalar {
    Time(Option<DateTime<Utc>>),
    Flag(bool),
    Int(i64),
    Float(f64),
}

impl Scalar {
    fn into_value(self) -> FieldValue {
        match self {
            Scalar::Time(t) => FieldValue::Time(t),
            Scalar::Flag(b) => FieldValue::Flag(b),
            Scalar::Int(v) => FieldValue::Int(v),
            Scalar::Float(v) => FieldValue::Float(v),
        }
    }
}

fn read_scalar(kind: FieldKind, b: &[u8]) -> Scalar {
    match kind {
        FieldKind::Mjd => {
            let mut raw = [0u8; MJD_SIZE];
            raw.copy_from_slice(b);
            Scalar::Time(decode_mjd2000(&raw))
        }
        FieldKind::Flag => Scalar::Flag(b[0] != 0),
        FieldKind::Int32 => Scalar::Int(i64::from(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))),
        FieldKind::UInt32 => Scalar::Int(i64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))),
        FieldKind::Float32 => Scalar::Float(f64::from(f32::from_be_bytes([b[0], b[1], b[2], b[3]]))),
    }
}

/// Read `count` big-endian f32 values starting at `offset`
pub fn read_f32_vector(buf: &[u8], offset: usize, count: usize) -> Result<Vec<f32>, ProductError> {
    let end = count
        .checked_mul(4)
        .and_then(|len| len.checked_add(offset))
        .ok_or_else(|| ProductError::Parse(format!("f32 vector of {count} values at {offset} is out of range")))?;
    if buf.len() < end {
        return Err(ProductError::Truncated {
            what: format!("f32 vector at offset {offset}"),
            needed: end as u64,
            available: buf.len() as u64,
        });
    }
    Ok(buf[offset..end]
        .chunks_exact(4)
        .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
