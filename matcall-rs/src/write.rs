//! Input serialization: writing Level 5 MAT files.
//!
//! The interpreter's `load` command reads Level 5 files regardless of the
//! version requested for the *output* side, so input bindings are always
//! written in this one format (the same policy the bridge has always had:
//! the version selector only affects the emitted `save` flag and the decode
//! path).
//!
//! Format reference: "MAT-File Format" (MathWorks), Level 5. Each variable
//! is one `miMATRIX` element holding array flags, dimensions, the name and
//! the element data, all little-endian.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::value::NumArray;

// MAT-file data type tags.
const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;

// Array class and flags.
const MX_DOUBLE_CLASS: u32 = 6;
const FLAG_COMPLEX: u32 = 0x0800;

/// Write a set of named arrays to a Level 5 MAT file.
///
/// # Errors
///
/// - [`Error::Serialize`] for an empty or non-ASCII variable name
/// - [`Error::Io`] if the file cannot be written
pub fn save_arrays(path: &Path, vars: &BTreeMap<String, NumArray>) -> Result<()> {
    let mut buf = Vec::new();
    write_header(&mut buf)?;

    for (name, array) in vars {
        write_matrix(&mut buf, name, array)?;
    }

    fs::write(path, &buf)?;
    Ok(())
}

/// Write the 128-byte MAT file header.
fn write_header(buf: &mut Vec<u8>) -> Result<()> {
    let text = b"MATLAB 5.0 MAT-file, created by matcall-rs";
    let mut descriptive = [b' '; 116];
    descriptive[..text.len()].copy_from_slice(text);

    buf.extend_from_slice(&descriptive);
    buf.extend_from_slice(&[0u8; 8]); // subsystem data offset, unused
    buf.write_u16::<LittleEndian>(0x0100)?;
    // Endian indicator: reads back as 'M','I' on a little-endian decoder.
    buf.write_u16::<LittleEndian>(0x4D49)?;
    Ok(())
}

/// Write one variable as a miMATRIX element.
fn write_matrix(buf: &mut Vec<u8>, name: &str, array: &NumArray) -> Result<()> {
    if name.is_empty() {
        return Err(Error::serialize(name, "variable name is empty"));
    }
    if !name.is_ascii() {
        return Err(Error::serialize(name, "variable name is not ASCII"));
    }

    let mut body = Vec::new();

    // Array flags: class in the low byte, complex bit above it.
    let mut flags = MX_DOUBLE_CLASS;
    if array.is_complex() {
        flags |= FLAG_COMPLEX;
    }
    let mut flag_bytes = Vec::with_capacity(8);
    flag_bytes.write_u32::<LittleEndian>(flags)?;
    flag_bytes.write_u32::<LittleEndian>(0)?;
    write_element(&mut body, MI_UINT32, &flag_bytes)?;

    // Dimensions. MATLAB arrays always have at least two.
    let dims: Vec<usize> = match array.shape() {
        [n] => vec![*n, 1],
        other => other.to_vec(),
    };
    let mut dim_bytes = Vec::with_capacity(dims.len() * 4);
    for d in &dims {
        dim_bytes.write_i32::<LittleEndian>(*d as i32)?;
    }
    write_element(&mut body, MI_INT32, &dim_bytes)?;

    // Name.
    write_element(&mut body, MI_INT8, name.as_bytes())?;

    // Real part (and imaginary part for complex arrays).
    write_element(&mut body, MI_DOUBLE, &f64_bytes(array.real_data())?)?;
    if let Some(imag) = array.imag_data() {
        write_element(&mut body, MI_DOUBLE, &f64_bytes(imag)?)?;
    }

    buf.write_u32::<LittleEndian>(MI_MATRIX)?;
    buf.write_u32::<LittleEndian>(body.len() as u32)?;
    buf.extend_from_slice(&body);
    Ok(())
}

/// Write one sub-element: 8-byte tag, data, padding to an 8-byte boundary.
fn write_element(buf: &mut Vec<u8>, dtype: u32, data: &[u8]) -> Result<()> {
    buf.write_u32::<LittleEndian>(dtype)?;
    buf.write_u32::<LittleEndian>(data.len() as u32)?;
    buf.extend_from_slice(data);

    let rem = data.len() % 8;
    if rem != 0 {
        buf.extend_from_slice(&[0u8; 8][..8 - rem]);
    }
    Ok(())
}

/// Encode an f64 slice as little-endian bytes.
fn f64_bytes(data: &[f64]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(data.len() * 8);
    for v in data {
        bytes.write_f64::<LittleEndian>(*v)?;
    }
    Ok(bytes)
}
