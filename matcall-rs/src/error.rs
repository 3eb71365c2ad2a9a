//! Error types for bridge operations.
//!
//! This module provides the [`Error`] enum covering all failure modes of a
//! bridged interpreter call, along with a convenient [`Result`] type alias.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while calling into MATLAB/Octave.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested MAT exchange version is not one of 4, 6, 7 or 7.3.
    ///
    /// Raised before any file is written or process spawned.
    #[error("Unsupported MAT version: '{value}' (expected 4, 6, 7 or 7.3)")]
    UnsupportedVersion {
        /// The rejected version string.
        value: String,
    },

    /// An input binding could not be encoded to the MAT format.
    #[error("Cannot serialize variable '{name}': {reason}")]
    Serialize {
        /// Name of the offending input binding.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// The output exchange file was not produced by the interpreter.
    ///
    /// The bridge never inspects the interpreter's exit status, so a crash,
    /// a missing binary or an error inside the called function all surface
    /// as this variant once the call returns.
    #[error("Output file not found: {path} (interpreter call likely failed)")]
    MissingOutput {
        /// Expected location of the output exchange file.
        path: PathBuf,
    },

    /// The output exchange file exists but could not be decoded.
    #[error("Invalid MAT file: {reason}")]
    InvalidFormat {
        /// Description of the format error.
        reason: String,
    },

    /// A requested output variable is missing from the output file.
    #[error("Variable '{name}' not found in '{path}'")]
    VariableNotFound {
        /// Name of the missing variable.
        name: String,
        /// Path of the file that was searched.
        path: PathBuf,
    },

    /// A v7.3 output was requested but the crate was built without the
    /// `hdf5` feature.
    #[error("MAT v7.3 decoding requires the 'hdf5' cargo feature")]
    Hdf5Disabled,

    /// Error from the HDF5 library while walking a v7.3 file.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

impl Error {
    /// Create an UnsupportedVersion error.
    pub fn unsupported_version(value: impl Into<String>) -> Self {
        Self::UnsupportedVersion { value: value.into() }
    }

    /// Create a Serialize error for the given variable.
    pub fn serialize(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Serialize {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidFormat error with the given reason.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat { reason: reason.into() }
    }

    /// Create a VariableNotFound error.
    pub fn variable_not_found(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::VariableNotFound {
            name: name.into(),
            path: path.into(),
        }
    }
}
