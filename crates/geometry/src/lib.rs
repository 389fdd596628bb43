//! Cells, regions, and bounding boxes for r2s workflows
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod bbox;
mod cell;
mod error;
mod io;
mod region;

#[doc(inline)]
pub use bbox::BoundingBox;

#[doc(inline)]
pub use cell::{Cell, Geometry};

#[doc(inline)]
pub use region::{Complement, Cuboid, CylinderZ, Intersection, Region, Sphere, Union};

#[doc(inline)]
pub use io::{
    read_bounding_boxes, read_cell_list, read_volumes, write_bounding_boxes, write_cell_list,
    write_volumes,
};

#[doc(inline)]
pub use error::{Error, Result};

// points are nalgebra points everywhere
pub use nalgebra::Point3;
