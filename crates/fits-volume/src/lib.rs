#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod block;
pub mod cube;
pub mod error;
pub mod header;
pub mod policy;
pub mod round;
pub mod value;
pub mod volume;
pub mod wcs;

pub use cube::{read_cube, serialize_cube, Cube, CubeSource};
pub use error::{Error, Result};
pub use policy::{AxisOrder, ExtractionPolicy, DEFAULT_TEAM};
pub use volume::{
    extract, extract_from_cube, get_volume_from_coords, sum_selection, BoxWidths, Query, Selection,
};
pub use wcs::{AxisWcs, CoordinateHeader};

#[cfg(feature = "std")]
pub use cube::open_cube;
