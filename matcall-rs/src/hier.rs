//! Output deserialization for hierarchical (v7.3) MAT files.
//!
//! v7.3 files are HDF5 trees: each MATLAB variable is a top-level group or
//! dataset, structs become nested groups, and numeric fields become
//! datasets. This module walks one requested output variable at a time and
//! rebuilds it as a [`MatValue`] tree.
//!
//! Entries whose names start with `#` or `_` carry format metadata (refs
//! tables and the like) and are skipped. Leaves whose element type cannot
//! be represented outside the interpreter (object references, compound
//! types) are skipped with a printed notice instead of failing the decode;
//! everything else in the variable still comes back. That tolerance is
//! deliberate: an exchange-file object reference has no faithful host-side
//! representation anyway.

use std::collections::BTreeMap;
use std::path::Path;

use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use hdf5::{Dataset, Group};
use ndarray::ArrayD;

use crate::error::{Error, Result};
use crate::value::{MatValue, NumArray};

/// One entry of a v7.3 tree, classified for the walk.
enum Entry {
    /// A nested group, decoded into a struct field.
    Group(Group),
    /// A dataset with a numeric or boolean element type.
    Leaf(Dataset),
    /// A dataset whose element type cannot be reconstructed host-side.
    Opaque(String),
}

/// Decode one top-level variable from a v7.3 MAT file.
///
/// # Errors
///
/// - [`Error::Hdf5`] if the file cannot be opened or read
/// - [`Error::VariableNotFound`] if no top-level entry matches `name`
pub fn load_variable(path: &Path, name: &str, squeeze: bool) -> Result<MatValue> {
    let file = hdf5::File::open(path)?;

    if !file.member_names()?.iter().any(|n| n == name) {
        return Err(Error::variable_not_found(name, path));
    }

    match classify(&file, name)? {
        Entry::Group(group) => walk_group(&group, squeeze),
        Entry::Leaf(dataset) => Ok(MatValue::Array(read_leaf(&dataset, squeeze)?)),
        Entry::Opaque(dtype) => Err(Error::invalid_format(format!(
            "variable '{}' has unsupported element type {}",
            name, dtype
        ))),
    }
}

/// Recursively decode a group into a struct value.
fn walk_group(group: &Group, squeeze: bool) -> Result<MatValue> {
    let mut fields = BTreeMap::new();

    for name in group.member_names()? {
        if name.starts_with('#') || name.starts_with('_') {
            continue;
        }

        match classify(group, &name)? {
            Entry::Group(child) => {
                fields.insert(name, walk_group(&child, squeeze)?);
            }
            Entry::Leaf(dataset) => {
                fields.insert(name, MatValue::Array(read_leaf(&dataset, squeeze)?));
            }
            Entry::Opaque(dtype) => {
                eprintln!("notice: skipping mat file object '{}' ({})", name, dtype);
            }
        }
    }

    Ok(MatValue::Struct(fields))
}

/// Classify a named member of a group.
fn classify(parent: &Group, name: &str) -> Result<Entry> {
    if let Ok(group) = parent.group(name) {
        return Ok(Entry::Group(group));
    }

    let dataset = parent.dataset(name)?;
    let descriptor = dataset.dtype()?.to_descriptor()?;

    match descriptor {
        TypeDescriptor::Integer(_)
        | TypeDescriptor::Unsigned(_)
        | TypeDescriptor::Float(_)
        | TypeDescriptor::Boolean => Ok(Entry::Leaf(dataset)),
        other => Ok(Entry::Opaque(format!("{:?}", other))),
    }
}

/// Read a numeric dataset, widening to f64.
///
/// MATLAB writes arrays with the dimensions reversed (HDF5 is row-major,
/// MATLAB is column-major); [`NumArray::from_hdf5_buffer`] flips the shape
/// back so the host sees the MATLAB dimensions.
fn read_leaf(dataset: &Dataset, squeeze: bool) -> Result<NumArray> {
    let descriptor = dataset.dtype()?.to_descriptor()?;

    let (data, dtype): (ArrayD<f64>, &str) = match descriptor {
        TypeDescriptor::Float(FloatSize::U8) => (dataset.read_dyn::<f64>()?, "double"),
        TypeDescriptor::Float(FloatSize::U4) => {
            (dataset.read_dyn::<f32>()?.mapv(f64::from), "single")
        }
        TypeDescriptor::Integer(IntSize::U1) => {
            (dataset.read_dyn::<i8>()?.mapv(f64::from), "int8")
        }
        TypeDescriptor::Integer(IntSize::U2) => {
            (dataset.read_dyn::<i16>()?.mapv(f64::from), "int16")
        }
        TypeDescriptor::Integer(IntSize::U4) => {
            (dataset.read_dyn::<i32>()?.mapv(f64::from), "int32")
        }
        TypeDescriptor::Integer(IntSize::U8) => {
            (dataset.read_dyn::<i64>()?.mapv(|x| x as f64), "int64")
        }
        TypeDescriptor::Unsigned(IntSize::U1) => {
            (dataset.read_dyn::<u8>()?.mapv(f64::from), "uint8")
        }
        TypeDescriptor::Unsigned(IntSize::U2) => {
            (dataset.read_dyn::<u16>()?.mapv(f64::from), "uint16")
        }
        TypeDescriptor::Unsigned(IntSize::U4) => {
            (dataset.read_dyn::<u32>()?.mapv(f64::from), "uint32")
        }
        TypeDescriptor::Unsigned(IntSize::U8) => {
            (dataset.read_dyn::<u64>()?.mapv(|x| x as f64), "uint64")
        }
        TypeDescriptor::Boolean => {
            (dataset.read_dyn::<bool>()?.mapv(|x| x as u8 as f64), "logical")
        }
        other => {
            return Err(Error::invalid_format(format!(
                "unsupported dataset element type {:?}",
                other
            )))
        }
    };

    let mut array = NumArray::from_hdf5_buffer(data, dtype);
    if squeeze {
        array = array.squeeze();
    }
    Ok(array)
}
