//! Output deserialization for flat MAT files (versions 4, 6 and 7).
//!
//! Versions 6 and 7 are Level 5 files, parsed with the `matfile` crate.
//! Version 4 predates Level 5 and has its own fixed per-matrix header,
//! decoded here directly. The two layouts are told apart by sniffing the
//! first bytes: a Level 5 file opens with descriptive ASCII text, a
//! Level 4 file with a small binary type code.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use matfile::MatFile;

use crate::error::{Error, Result};
use crate::value::{MatValue, NumArray};

// Level 4 data precision codes (the P digit of the type field).
const V4_DOUBLE: i32 = 0;
const V4_SINGLE: i32 = 1;
const V4_INT32: i32 = 2;
const V4_INT16: i32 = 3;
const V4_UINT16: i32 = 4;
const V4_UINT8: i32 = 5;

/// Decode a flat MAT file into a map of variable name to value.
///
/// The whole file decodes in one step. Metadata entries (names starting
/// with `__`) are filtered out; variables the decoder cannot represent
/// (cell arrays, sparse matrices, objects, text) are dropped and never
/// reach the result map, so a partially supported file still decodes.
///
/// # Errors
///
/// - [`Error::Io`] if the file cannot be read
/// - [`Error::InvalidFormat`] if it is not a valid MAT file
pub fn load_flat(path: &Path, squeeze: bool) -> Result<BTreeMap<String, MatValue>> {
    let bytes = fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open MAT file '{}': {}", path.display(), e),
        ))
    })?;

    if is_level4(&bytes) {
        return load_v4(&bytes, path, squeeze);
    }

    let mat = MatFile::parse(bytes.as_slice()).map_err(|e| {
        Error::invalid_format(format!(
            "failed to parse MAT file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let mut values = BTreeMap::new();
    for array in mat.arrays() {
        let name = array.name().to_string();
        if name.starts_with("__") {
            continue;
        }

        let mut data = NumArray::from_matfile_array(array);
        if squeeze {
            data = data.squeeze();
        }
        values.insert(name, MatValue::Array(data));
    }

    Ok(values)
}

/// Sniff the file layout.
///
/// A Level 5 file starts with 116 bytes of descriptive ASCII text, which
/// contains no zero byte; a Level 4 file starts with a small little-endian
/// type code, which always does.
fn is_level4(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4].contains(&0)
}

/// Decode a Level 4 MAT file.
///
/// Each matrix is a 20-byte header (type, rows, cols, imaginary flag, name
/// length), the NUL-terminated name, then column-major data, with an
/// optional imaginary block of the same size. Text and sparse matrices are
/// consumed but not reported, matching the numeric-only contract of the
/// Level 5 path.
fn load_v4(bytes: &[u8], path: &Path, squeeze: bool) -> Result<BTreeMap<String, MatValue>> {
    let mut pos = 0;
    let mut values = BTreeMap::new();

    while pos < bytes.len() {
        let header = take(bytes, &mut pos, 20, path)?;
        let mopt = LittleEndian::read_i32(&header[0..4]);
        let mrows = LittleEndian::read_i32(&header[4..8]);
        let ncols = LittleEndian::read_i32(&header[8..12]);
        let imagf = LittleEndian::read_i32(&header[12..16]);
        let namlen = LittleEndian::read_i32(&header[16..20]);

        // Type field digits: M is the byte order (0 = little-endian), O is
        // always zero, P the data precision, T the matrix kind (0 full,
        // 1 text, 2 sparse).
        let (m, o, t) = (mopt / 1000, mopt / 100 % 10, mopt % 10);
        let precision = mopt / 10 % 10;
        if mopt < 0 || m != 0 || o != 0 || t > 2 {
            return Err(Error::invalid_format(format!(
                "'{}': unsupported v4 type field {}",
                path.display(),
                mopt
            )));
        }
        if mrows < 0 || ncols < 0 || namlen <= 0 {
            return Err(Error::invalid_format(format!(
                "'{}': malformed v4 matrix header",
                path.display()
            )));
        }

        let name_bytes = take(bytes, &mut pos, namlen as usize, path)?;
        let name = String::from_utf8_lossy(name_bytes)
            .trim_end_matches('\0')
            .to_string();

        let count = mrows as usize * ncols as usize;
        let real = read_v4_data(bytes, &mut pos, precision, count, path)?;
        let imag = if imagf != 0 {
            Some(read_v4_data(bytes, &mut pos, precision, count, path)?)
        } else {
            None
        };

        // Text and sparse entries have no host-side numeric meaning; their
        // bytes are consumed above so the walk stays aligned.
        if t != 0 {
            continue;
        }

        let mut array = NumArray::new(vec![mrows as usize, ncols as usize], real)?
            .with_dtype(v4_dtype(precision));
        if let Some(imag) = imag {
            array = array.with_imag(imag)?;
        }
        if squeeze {
            array = array.squeeze();
        }
        values.insert(name, MatValue::Array(array));
    }

    Ok(values)
}

/// Read one data block, widening every element to f64.
fn read_v4_data(
    bytes: &[u8],
    pos: &mut usize,
    precision: i32,
    count: usize,
    path: &Path,
) -> Result<Vec<f64>> {
    let width = match precision {
        V4_DOUBLE => 8,
        V4_SINGLE | V4_INT32 => 4,
        V4_INT16 | V4_UINT16 => 2,
        V4_UINT8 => 1,
        other => {
            return Err(Error::invalid_format(format!(
                "'{}': unsupported v4 precision {}",
                path.display(),
                other
            )))
        }
    };

    let size = count.checked_mul(width).ok_or_else(|| {
        Error::invalid_format(format!("'{}': v4 matrix too large", path.display()))
    })?;
    let raw = take(bytes, pos, size, path)?;

    Ok(raw
        .chunks_exact(width)
        .map(|chunk| match precision {
            V4_DOUBLE => LittleEndian::read_f64(chunk),
            V4_SINGLE => LittleEndian::read_f32(chunk) as f64,
            V4_INT32 => LittleEndian::read_i32(chunk) as f64,
            V4_INT16 => LittleEndian::read_i16(chunk) as f64,
            V4_UINT16 => LittleEndian::read_u16(chunk) as f64,
            _ => chunk[0] as f64,
        })
        .collect())
}

fn v4_dtype(precision: i32) -> &'static str {
    match precision {
        V4_DOUBLE => "double",
        V4_SINGLE => "single",
        V4_INT32 => "int32",
        V4_INT16 => "int16",
        V4_UINT16 => "uint16",
        _ => "uint8",
    }
}

/// Take the next `n` bytes, failing on truncation.
fn take<'a>(bytes: &'a [u8], pos: &mut usize, n: usize, path: &Path) -> Result<&'a [u8]> {
    let end = pos
        .checked_add(n)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| {
            Error::invalid_format(format!("'{}': truncated v4 MAT file", path.display()))
        })?;
    let slice = &bytes[*pos..end];
    *pos = end;
    Ok(slice)
}
