use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::Serialize;

use super::array::DataArray;
use super::attrs::{AttrValue, Attrs};
use super::coords::Coordinate;
use crate::error::{Error, Result};

/// A collection of labeled arrays sharing coordinates and global attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub coords: BTreeMap<String, Coordinate>,
    pub data_vars: BTreeMap<String, DataArray>,
    pub attrs: Attrs,
}

/// Serializable summary of a dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetDescription {
    pub sizes: BTreeMap<String, usize>,
    pub coords: BTreeMap<String, CoordinateDescription>,
    pub data_vars: BTreeMap<String, VariableDescription>,
    pub attrs: Attrs,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinateDescription {
    pub dims: Vec<String>,
    pub dtype: &'static str,
    pub values: AttrValue,
    pub attrs: Attrs,
    pub encoding: Attrs,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDescription {
    pub dims: Vec<String>,
    pub dtype: &'static str,
    pub shape: Vec<usize>,
    pub attrs: Attrs,
}

impl Dataset {
    /// Build a dataset; coordinates are the union of the variables' coordinates
    pub fn new(data_vars: Vec<DataArray>, attrs: Attrs) -> Self {
        let mut coords = BTreeMap::new();
        for var in &data_vars {
            for (name, coord) in &var.coords {
                coords.entry(name.clone()).or_insert_with(|| coord.clone());
            }
        }
        Dataset {
            coords,
            data_vars: data_vars.into_iter().map(|v| (v.name.clone(), v)).collect(),
            attrs,
        }
    }

    /// Dataset with coordinates and attributes only
    pub fn with_coords(coords: BTreeMap<String, Coordinate>, attrs: Attrs) -> Self {
        Dataset {
            coords,
            data_vars: BTreeMap::new(),
            attrs,
        }
    }

    pub fn data_var(&self, name: &str) -> Option<&DataArray> {
        self.data_vars.get(name)
    }

    pub fn sizes(&self) -> BTreeMap<String, usize> {
        let mut sizes = BTreeMap::new();
        for coord in self.coords.values() {
            sizes.insert(coord.dim.clone(), coord.len());
        }
        for var in self.data_vars.values() {
            sizes.extend(var.sizes());
        }
        sizes
    }

    /// Positional selection along `dim` for every variable and coordinate
    pub fn isel(&self, dim: &str, range: Range<usize>) -> Result<Self> {
        let sizes = self.sizes();
        let len = *sizes
            .get(dim)
            .ok_or_else(|| Error::dimension(format!("no dimension {dim:?} in dataset")))?;
        if range.start > range.end || range.end > len {
            return Err(Error::dimension(format!(
                "index {range:?} out of range for dimension {dim:?} of size {len}"
            )));
        }

        let data_vars = self
            .data_vars
            .iter()
            .map(|(name, var)| Ok((name.clone(), var.isel(dim, range.clone())?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        let coords = self
            .coords
            .iter()
            .map(|(name, c)| {
                let c = if c.dim == dim { c.isel(range.clone()) } else { c.clone() };
                (name.clone(), c)
            })
            .collect();

        Ok(Dataset {
            coords,
            data_vars,
            attrs: self.attrs.clone(),
        })
    }

    pub fn describe(&self) -> DatasetDescription {
        DatasetDescription {
            sizes: self.sizes(),
            coords: self
                .coords
                .iter()
                .map(|(name, c)| {
                    (
                        name.clone(),
                        CoordinateDescription {
                            dims: vec![c.dim.clone()],
                            dtype: c.values.dtype(),
                            values: c.values.to_attr(),
                            attrs: c.attrs.clone(),
                            encoding: c.encoding.clone(),
                        },
                    )
                })
                .collect(),
            data_vars: self
                .data_vars
                .iter()
                .map(|(name, v)| {
                    let (rows, cols) = v.shape();
                    (
                        name.clone(),
                        VariableDescription {
                            dims: v.dims.to_vec(),
                            dtype: v.data.dtype(),
                            shape: vec![rows, cols],
                            attrs: v.attrs.clone(),
                        },
                    )
                })
                .collect(),
            attrs: self.attrs.clone(),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 30;
        writeln!(f, "<xarray.Dataset>")?;
        let dims: Vec<String> = self.sizes().iter().map(|(d, n)| format!("{d}: {n}")).collect();
        writeln!(f, "Dimensions:  ({})", dims.join(", "))?;

        writeln!(f, "Coordinates:")?;
        for (name, coord) in &self.coords {
            let marker = if *name == coord.dim { "*" } else { " " };
            writeln!(
                f,
                "  {marker} {name:<WIDTH$} ({}) {} {}",
                coord.dim,
                coord.values.dtype(),
                coord.values.preview(3)
            )?;
        }

        writeln!(f, "Data variables:")?;
        for (name, var) in &self.data_vars {
            writeln!(f, "    {name:<WIDTH$} ({}) {} ...", var.dims.join(", "), var.data.dtype())?;
        }

        writeln!(f, "Attributes:")?;
        for (key, value) in &self.attrs {
            let mut text = value.to_string();
            if text.len() > 60 {
                let cut = (0..=60).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
                text.truncate(cut);
                text.push_str("...");
            }
            writeln!(f, "    {key:<WIDTH$} {text}")?;
        }
        Ok(())
    }
}
