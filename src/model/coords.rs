use std::ops::Range;

use chrono::{DateTime, SecondsFormat, Utc};
use ndarray::{Array1, s};

use super::attrs::{AttrValue, Attrs};

/// Values of a one-dimensional coordinate
#[derive(Debug, Clone, PartialEq)]
pub enum CoordValues {
    Int(Array1<i64>),
    Float(Array1<f64>),
    Time(Vec<DateTime<Utc>>),
}

impl CoordValues {
    pub fn len(&self) -> usize {
        match self {
            CoordValues::Int(v) => v.len(),
            CoordValues::Float(v) => v.len(),
            CoordValues::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            CoordValues::Int(_) => "int64",
            CoordValues::Float(_) => "float64",
            CoordValues::Time(_) => "datetime64[ns]",
        }
    }

    /// Positional slice; the caller checks bounds
    fn slice(&self, range: Range<usize>) -> Self {
        match self {
            CoordValues::Int(v) => CoordValues::Int(v.slice(s![range]).to_owned()),
            CoordValues::Float(v) => CoordValues::Float(v.slice(s![range]).to_owned()),
            CoordValues::Time(v) => CoordValues::Time(v[range].to_vec()),
        }
    }

    pub fn to_attr(&self) -> AttrValue {
        match self {
            CoordValues::Int(v) => AttrValue::IntList(v.to_vec()),
            CoordValues::Float(v) => AttrValue::FloatList(v.to_vec()),
            CoordValues::Time(v) => AttrValue::List(v.iter().map(|t| AttrValue::Time(*t)).collect()),
        }
    }

    /// Short rendering of the leading values for the dataset repr
    pub fn preview(&self, max: usize) -> String {
        let mut parts: Vec<String> = match self {
            CoordValues::Int(v) => v.iter().take(max).map(|x| x.to_string()).collect(),
            CoordValues::Float(v) => v.iter().take(max).map(|x| format!("{:.6e}", x)).collect(),
            CoordValues::Time(v) => v
                .iter()
                .take(max)
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true))
                .collect(),
        };
        if self.len() > max {
            parts.push("...".to_string());
        }
        parts.join(" ")
    }
}

/// A labeled vector along one dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub dim: String,
    pub values: CoordValues,
    pub attrs: Attrs,
    /// Serialization hints such as `units` for time coordinates
    pub encoding: Attrs,
}

impl Coordinate {
    pub fn new(dim: impl Into<String>, values: CoordValues) -> Self {
        Coordinate {
            dim: dim.into(),
            values,
            attrs: Attrs::new(),
            encoding: Attrs::new(),
        }
    }

    pub fn with_encoding(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.encoding.insert(key.to_string(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn isel(&self, range: Range<usize>) -> Self {
        Coordinate {
            dim: self.dim.clone(),
            values: self.values.slice(range),
            attrs: self.attrs.clone(),
            encoding: self.encoding.clone(),
        }
    }
}
