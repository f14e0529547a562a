use std::collections::BTreeMap;
use std::ops::Range;

use ndarray::{Array2, Axis, Slice};
use num_complex::Complex;

use super::attrs::Attrs;
use super::coords::Coordinate;
use crate::error::{Error, Result};

/// Pixel storage: complex samples for SLC products, real for detected ones
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Complex(Array2<Complex<f32>>),
    Real(Array2<f32>),
}

impl ArrayData {
    pub fn dtype(&self) -> &'static str {
        match self {
            ArrayData::Complex(_) => "complex64",
            ArrayData::Real(_) => "float32",
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        match self {
            ArrayData::Complex(a) => a.dim(),
            ArrayData::Real(a) => a.dim(),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, ArrayData::Complex(_))
    }

    fn slice_axis(&self, axis: usize, range: Range<usize>) -> Self {
        let slice = Slice::from(range);
        match self {
            ArrayData::Complex(a) => ArrayData::Complex(a.slice_axis(Axis(axis), slice).to_owned()),
            ArrayData::Real(a) => ArrayData::Real(a.slice_axis(Axis(axis), slice).to_owned()),
        }
    }
}

/// A two-dimensional labeled array
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    pub name: String,
    pub dims: [String; 2],
    pub data: ArrayData,
    pub coords: BTreeMap<String, Coordinate>,
    pub attrs: Attrs,
}

impl DataArray {
    pub fn new(name: impl Into<String>, dims: [&str; 2], data: ArrayData) -> Self {
        DataArray {
            name: name.into(),
            dims: dims.map(str::to_string),
            data,
            coords: BTreeMap::new(),
            attrs: Attrs::new(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn sizes(&self) -> BTreeMap<String, usize> {
        let (rows, cols) = self.shape();
        BTreeMap::from([(self.dims[0].clone(), rows), (self.dims[1].clone(), cols)])
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.get(name)
    }

    fn axis_of(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| Error::dimension(format!("{}: no dimension {dim:?} in {:?}", self.name, self.dims)))
    }

    fn axis_len(&self, axis: usize) -> usize {
        let (rows, cols) = self.shape();
        if axis == 0 { rows } else { cols }
    }

    /// Attach a coordinate along one of the array's dimensions
    pub fn assign_coords(&mut self, name: impl Into<String>, coord: Coordinate) -> Result<()> {
        let name = name.into();
        let axis = self.axis_of(&coord.dim)?;
        let expected = self.axis_len(axis);
        if coord.len() != expected {
            return Err(Error::dimension(format!(
                "coordinate {name:?} has {} values but dimension {:?} has size {expected}",
                coord.len(),
                coord.dim
            )));
        }
        self.coords.insert(name, coord);
        Ok(())
    }

    /// Replace dimension `old` by `new`. A coordinate named `new` must already
    /// be defined along `old`; every coordinate on `old` moves to `new`.
    pub fn swap_dims(&mut self, swaps: &[(&str, &str)]) -> Result<()> {
        for (old, new) in swaps {
            let axis = self.axis_of(old)?;
            match self.coords.get(*new) {
                Some(c) if c.dim == *old => {}
                Some(c) => {
                    return Err(Error::dimension(format!(
                        "coordinate {new:?} is defined along {:?}, not {old:?}",
                        c.dim
                    )));
                }
                None => {
                    return Err(Error::dimension(format!("no coordinate {new:?} to swap {old:?} with")));
                }
            }
            self.dims[axis] = new.to_string();
            for coord in self.coords.values_mut() {
                if coord.dim == *old {
                    coord.dim = new.to_string();
                }
            }
        }
        Ok(())
    }

    /// Positional selection along `dim`
    pub fn isel(&self, dim: &str, range: Range<usize>) -> Result<Self> {
        let axis = self.axis_of(dim)?;
        let len = self.axis_len(axis);
        if range.start > range.end || range.end > len {
            return Err(Error::dimension(format!(
                "index {range:?} out of range for dimension {dim:?} of size {len}"
            )));
        }

        let coords = self
            .coords
            .iter()
            .map(|(name, c)| {
                let c = if c.dim == dim { c.isel(range.clone()) } else { c.clone() };
                (name.clone(), c)
            })
            .collect();

        Ok(DataArray {
            name: self.name.clone(),
            dims: self.dims.clone(),
            data: self.data.slice_axis(axis, range),
            coords,
            attrs: self.attrs.clone(),
        })
    }
}
