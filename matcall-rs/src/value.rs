//! Host-side value representation for exchanged variables.
//!
//! [`NumArray`] holds a single numeric array in MATLAB's column-major
//! layout; [`MatValue`] is the tagged variant that decoded outputs are
//! made of (a plain array, or a nested struct of named fields).

use std::collections::BTreeMap;

use matfile::{Array as MatArray, NumericData};
use ndarray::{Array1, Array2, ArrayD, IxDyn, ShapeBuilder};

use crate::error::{Error, Result};

/// An n-dimensional numeric array exchanged with the interpreter.
///
/// # Data Layout
///
/// Data is stored in MATLAB's column-major (Fortran) order. The ndarray
/// conversion methods take care of the reordering, so callers never deal
/// with the raw layout directly.
///
/// # Example
///
/// ```
/// use matcall_rs::NumArray;
/// use ndarray::array;
///
/// let a = NumArray::from_array2(&array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
/// assert_eq!(a.shape(), &[2, 3]);
///
/// let back = a.to_array2()?;
/// assert_eq!(back[[1, 2]], 6.0);
/// # Ok::<(), matcall_rs::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NumArray {
    /// Shape of the array (MATLAB dimension order).
    shape: Vec<usize>,

    /// Real part, column-major.
    real: Vec<f64>,

    /// Imaginary part (only for complex data).
    imag: Option<Vec<f64>>,

    /// Original element type name (for display purposes).
    dtype: String,
}

impl NumArray {
    /// Create an array from a shape and column-major data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the data length does not match
    /// the product of the dimensions.
    pub fn new(shape: Vec<usize>, real: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if real.len() != expected {
            return Err(Error::invalid_format(format!(
                "shape {:?} implies {} elements, got {}",
                shape,
                expected,
                real.len()
            )));
        }
        Ok(NumArray {
            shape,
            real,
            imag: None,
            dtype: "double".to_string(),
        })
    }

    /// Create a column vector (shape [N, 1]) from a flat Vec.
    pub fn from_vec(data: Vec<f64>) -> Self {
        NumArray {
            shape: vec![data.len(), 1],
            real: data,
            imag: None,
            dtype: "double".to_string(),
        }
    }

    /// Create a scalar (1x1) array.
    pub fn scalar(value: f64) -> Self {
        NumArray {
            shape: vec![1, 1],
            real: vec![value],
            imag: None,
            dtype: "double".to_string(),
        }
    }

    /// Create a column vector from a 1D ndarray.
    pub fn from_array1(a: &Array1<f64>) -> Self {
        Self::from_vec(a.to_vec())
    }

    /// Create a 2D array from an ndarray matrix.
    pub fn from_array2(a: &Array2<f64>) -> Self {
        let (rows, cols) = a.dim();
        // Transposed iteration yields the column-major element sequence.
        let real: Vec<f64> = a.t().iter().copied().collect();
        NumArray {
            shape: vec![rows, cols],
            real,
            imag: None,
            dtype: "double".to_string(),
        }
    }

    /// Create a NumArray from a parsed matfile array.
    pub(crate) fn from_matfile_array(array: &MatArray) -> Self {
        let shape: Vec<usize> = array.size().iter().map(|&x| x as usize).collect();
        let (real, imag, dtype) = widen_numeric_data(array.data());
        NumArray {
            shape,
            real,
            imag,
            dtype: dtype.to_string(),
        }
    }

    /// Create a NumArray from an n-dimensional row-major ndarray.
    ///
    /// Used by the v7.3 decode path: HDF5 stores MATLAB arrays with the
    /// dimensions reversed, so the raw C-order buffer of the dataset is
    /// already MATLAB's column-major sequence once the shape is flipped
    /// back.
    #[cfg(feature = "hdf5")]
    pub(crate) fn from_hdf5_buffer(a: ArrayD<f64>, dtype: &str) -> Self {
        let shape: Vec<usize> = a.shape().iter().rev().copied().collect();
        let shape = if shape.is_empty() { vec![1, 1] } else { shape };
        NumArray {
            shape,
            real: a.into_raw_vec(),
            imag: None,
            dtype: dtype.to_string(),
        }
    }

    /// Replace the element type name recorded for display.
    pub(crate) fn with_dtype(mut self, dtype: &str) -> Self {
        self.dtype = dtype.to_string();
        self
    }

    /// Attach an imaginary part, making the array complex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the imaginary part's length does
    /// not match the real part's.
    pub fn with_imag(mut self, imag: Vec<f64>) -> Result<Self> {
        if imag.len() != self.real.len() {
            return Err(Error::invalid_format(format!(
                "imaginary part has {} elements, real part has {}",
                imag.len(),
                self.real.len()
            )));
        }
        self.imag = Some(imag);
        Ok(self)
    }

    /// Get the shape of the array.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get the total number of elements.
    pub fn len(&self) -> usize {
        self.real.len()
    }

    /// Check if the array is empty.
    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    /// Check if the data is complex.
    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }

    /// Check if the array is a vector.
    ///
    /// MATLAB stores row vectors as [1, N] and column vectors as [N, 1];
    /// this returns true for both, as well as for true 1D shapes.
    pub fn is_1d(&self) -> bool {
        match self.shape.as_slice() {
            [_] => true,
            [1, _] => true,
            [_, 1] => true,
            _ => false,
        }
    }

    /// Get the original element type name.
    pub fn dtype(&self) -> &str {
        &self.dtype
    }

    /// Remove singleton dimensions from the shape.
    ///
    /// A 1x1 scalar keeps a single dimension of extent 1.
    pub fn squeeze(mut self) -> Self {
        self.shape.retain(|&d| d != 1);
        if self.shape.is_empty() {
            self.shape.push(1);
        }
        self
    }

    /// Get the single element of a scalar array.
    pub fn as_scalar(&self) -> Option<f64> {
        if self.real.len() == 1 {
            Some(self.real[0])
        } else {
            None
        }
    }

    /// Get the real part as a 1D ndarray.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the array is not a vector.
    pub fn to_array1(&self) -> Result<Array1<f64>> {
        if !self.is_1d() {
            return Err(Error::invalid_format(format!(
                "array is not 1D (shape: {:?})",
                self.shape
            )));
        }
        Ok(Array1::from_vec(self.real.clone()))
    }

    /// Get the real part as a 2D ndarray.
    ///
    /// Handles the column-major to row-major conversion; 1D shapes are
    /// treated as [N, 1].
    pub fn to_array2(&self) -> Result<Array2<f64>> {
        let (rows, cols) = self.dims_2d()?;
        Array2::from_shape_vec((rows, cols).f(), self.real.clone())
            .map_err(|e| Error::invalid_format(format!("shape error: {}", e)))
    }

    /// Get the real part as an n-dimensional ndarray.
    pub fn to_arrayd(&self) -> Result<ArrayD<f64>> {
        ArrayD::from_shape_vec(IxDyn(&self.shape).f(), self.real.clone())
            .map_err(|e| Error::invalid_format(format!("shape error: {}", e)))
    }

    /// Get the imaginary part as a 2D ndarray (for complex data).
    pub fn imag_to_array2(&self) -> Result<Array2<f64>> {
        let imag = self
            .imag
            .as_ref()
            .ok_or_else(|| Error::invalid_format("array is not complex"))?;
        let (rows, cols) = self.dims_2d()?;
        Array2::from_shape_vec((rows, cols).f(), imag.clone())
            .map_err(|e| Error::invalid_format(format!("shape error: {}", e)))
    }

    /// Get raw real data (column-major).
    pub fn real_data(&self) -> &[f64] {
        &self.real
    }

    /// Get raw imaginary data (column-major), if complex.
    pub fn imag_data(&self) -> Option<&[f64]> {
        self.imag.as_deref()
    }

    /// Get 2D dimensions, treating 1D as [N, 1].
    fn dims_2d(&self) -> Result<(usize, usize)> {
        match self.shape.as_slice() {
            [n] => Ok((*n, 1)),
            [r, c] => Ok((*r, *c)),
            _ => Err(Error::invalid_format(format!(
                "array is not 2D (shape: {:?})",
                self.shape
            ))),
        }
    }
}

/// Widen any supported matfile element type to f64 pairs.
fn widen_numeric_data(data: &NumericData) -> (Vec<f64>, Option<Vec<f64>>, &'static str) {
    macro_rules! widen {
        ($real:expr, $imag:expr, $name:literal) => {
            (
                $real.iter().map(|&x| x as f64).collect(),
                $imag.as_ref().map(|v| v.iter().map(|&x| x as f64).collect()),
                $name,
            )
        };
    }

    match data {
        NumericData::Double { real, imag } => (real.clone(), imag.clone(), "double"),
        NumericData::Single { real, imag } => widen!(real, imag, "single"),
        NumericData::Int8 { real, imag } => widen!(real, imag, "int8"),
        NumericData::Int16 { real, imag } => widen!(real, imag, "int16"),
        NumericData::Int32 { real, imag } => widen!(real, imag, "int32"),
        NumericData::Int64 { real, imag } => widen!(real, imag, "int64"),
        NumericData::UInt8 { real, imag } => widen!(real, imag, "uint8"),
        NumericData::UInt16 { real, imag } => widen!(real, imag, "uint16"),
        NumericData::UInt32 { real, imag } => widen!(real, imag, "uint32"),
        NumericData::UInt64 { real, imag } => widen!(real, imag, "uint64"),
    }
}

/// A decoded output value: either a numeric array or a nested struct.
///
/// Flat MAT files decode into `Array` values; the hierarchical v7.3 walk
/// produces `Struct` trees mirroring the interpreter's groups.
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    /// A numeric array leaf.
    Array(NumArray),

    /// A struct with named fields.
    Struct(BTreeMap<String, MatValue>),
}

impl MatValue {
    /// Get the array, if this value is one.
    pub fn as_array(&self) -> Option<&NumArray> {
        match self {
            MatValue::Array(a) => Some(a),
            MatValue::Struct(_) => None,
        }
    }

    /// Get the field map, if this value is a struct.
    pub fn as_struct(&self) -> Option<&BTreeMap<String, MatValue>> {
        match self {
            MatValue::Array(_) => None,
            MatValue::Struct(fields) => Some(fields),
        }
    }

    /// Look up a named field of a struct value.
    pub fn field(&self, name: &str) -> Option<&MatValue> {
        self.as_struct().and_then(|fields| fields.get(name))
    }

    /// Short description of the value, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            MatValue::Array(a) => {
                if a.is_complex() {
                    format!("{:?} {} (complex)", a.shape(), a.dtype())
                } else {
                    format!("{:?} {}", a.shape(), a.dtype())
                }
            }
            MatValue::Struct(fields) => format!("struct with {} fields", fields.len()),
        }
    }
}

impl From<NumArray> for MatValue {
    fn from(a: NumArray) -> Self {
        MatValue::Array(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = NumArray::new(vec![2, 3], vec![1.0; 5]).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_array2_round_trip() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let a = NumArray::from_array2(&m);

        // Column-major storage: columns are contiguous.
        assert_eq!(a.real_data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        let back = a.to_array2().unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_squeeze() {
        let a = NumArray::new(vec![5, 1], vec![0.0; 5]).unwrap().squeeze();
        assert_eq!(a.shape(), &[5]);

        let s = NumArray::scalar(3.5).squeeze();
        assert_eq!(s.shape(), &[1]);
        assert_relative_eq!(s.as_scalar().unwrap(), 3.5);
    }

    #[test]
    fn test_is_1d() {
        assert!(NumArray::new(vec![1, 4], vec![0.0; 4]).unwrap().is_1d());
        assert!(NumArray::new(vec![4, 1], vec![0.0; 4]).unwrap().is_1d());
        assert!(!NumArray::new(vec![2, 2], vec![0.0; 4]).unwrap().is_1d());
    }

    #[test]
    fn test_with_imag_length_checked() {
        let a = NumArray::from_vec(vec![1.0, 2.0]);
        assert!(a.clone().with_imag(vec![0.0, 1.0]).is_ok());
        assert!(a.with_imag(vec![0.0]).is_err());
    }

    #[test]
    fn test_struct_field_lookup() {
        let mut fields = BTreeMap::new();
        fields.insert("w".to_string(), MatValue::Array(NumArray::scalar(1.0)));
        let v = MatValue::Struct(fields);

        assert!(v.as_array().is_none());
        assert!(v.field("w").is_some());
        assert!(v.field("missing").is_none());
        assert_eq!(v.describe(), "struct with 1 fields");
    }
}
