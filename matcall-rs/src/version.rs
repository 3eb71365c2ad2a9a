//! MAT exchange format versions.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The MAT file version used for the output exchange file.
///
/// The version determines both the `save` flag emitted into the interpreter
/// command and the decode path used afterwards: versions 4/6/7 are flat
/// name-to-array files read in one step, while 7.3 is an HDF5 tree walked
/// one output variable at a time.
///
/// # Example
///
/// ```
/// use matcall_rs::MatVersion;
///
/// let v: MatVersion = "7.3".parse()?;
/// assert!(v.is_hierarchical());
/// assert_eq!(v.save_flag(), "-v7.3");
///
/// assert!("4.2".parse::<MatVersion>().is_err());
/// # Ok::<(), matcall_rs::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatVersion {
    /// Legacy v4 format (numeric matrices only).
    V4,
    /// v6 format (uncompressed Level 5).
    V6,
    /// v7 format (compressed Level 5).
    V7,
    /// v7.3 format (HDF5-based, required for variables over 2 GB).
    V73,
}

impl MatVersion {
    /// The flag passed to the interpreter's `save` command.
    pub fn save_flag(&self) -> &'static str {
        match self {
            MatVersion::V4 => "-v4",
            MatVersion::V6 => "-v6",
            MatVersion::V7 => "-v7",
            MatVersion::V73 => "-v7.3",
        }
    }

    /// Whether this version uses the hierarchical (HDF5) layout.
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, MatVersion::V73)
    }
}

impl Default for MatVersion {
    fn default() -> Self {
        MatVersion::V7
    }
}

impl FromStr for MatVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "4" => Ok(MatVersion::V4),
            "6" => Ok(MatVersion::V6),
            "7" => Ok(MatVersion::V7),
            "7.3" => Ok(MatVersion::V73),
            other => Err(Error::unsupported_version(other)),
        }
    }
}

impl fmt::Display for MatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatVersion::V4 => "4",
            MatVersion::V6 => "6",
            MatVersion::V7 => "7",
            MatVersion::V73 => "7.3",
        };
        f.write_str(s)
    }
}
