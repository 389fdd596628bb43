//! Read and write the per-cell JSON artifacts
//!
//! Cell ids are written as string keys, i.e. `{"101": ...}`, which is what
//! `serde_json` does for integer map keys anyway.

// crate modules
use crate::bbox::BoundingBox;
use crate::error::Result;

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write `{cid: [[xl,yl,zl],[xu,yu,zu]]}` to a JSON file
pub fn write_bounding_boxes<P: AsRef<Path>>(
    boxes: &BTreeMap<u32, BoundingBox>,
    path: P,
) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, boxes)?;
    Ok(())
}

/// Read `{cid: [[xl,yl,zl],[xu,yu,zu]]}` from a JSON file
pub fn read_bounding_boxes<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u32, BoundingBox>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write `{cid: volume}` to a JSON file
pub fn write_volumes<P: AsRef<Path>>(volumes: &BTreeMap<u32, f64>, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, volumes)?;
    Ok(())
}

/// Read `{cid: volume}` from a JSON file
pub fn read_volumes<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u32, f64>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write a plain list of cell ids to a JSON file
pub fn write_cell_list<P: AsRef<Path>>(cells: &[u32], path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, cells)?;
    Ok(())
}

/// Read a plain list of cell ids from a JSON file
pub fn read_cell_list<P: AsRef<Path>>(path: P) -> Result<Vec<u32>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
