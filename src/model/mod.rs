//! Labeled multidimensional arrays: named dimensions, coordinate vectors and
//! attribute dictionaries, shaped after xarray's `Dataset`/`DataArray`.
pub mod array;
pub mod attrs;
pub mod coords;
pub mod dataset;

pub use array::{ArrayData, DataArray};
pub use attrs::{AttrValue, Attrs};
pub use coords::{CoordValues, Coordinate};
pub use dataset::{Dataset, DatasetDescription};
