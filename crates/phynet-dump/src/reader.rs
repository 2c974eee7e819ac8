use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use nalgebra::{DMatrix, DVector};
use phynet_core::{checked_state_dimension, state_dimension, Dataset, ErrorInfo, FieldRecord, PhyError};
use serde::{Deserialize, Serialize};

/// Width of the floating point elements stored in a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precision {
    /// 4-byte IEEE-754 elements.
    Single,
    /// 8-byte IEEE-754 elements.
    #[default]
    Double,
}

impl Precision {
    /// Size of one element in bytes.
    pub fn width(self) -> usize {
        match self {
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }

    pub(crate) fn decode(self, bytes: &[u8]) -> f64 {
        match self {
            Precision::Single => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                f32::from_le_bytes(raw) as f64
            }
            Precision::Double => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                f64::from_le_bytes(raw)
            }
        }
    }

    pub(crate) fn encode(self, value: f64, out: &mut Vec<u8>) {
        match self {
            Precision::Single => out.extend_from_slice(&(value as f32).to_le_bytes()),
            Precision::Double => out.extend_from_slice(&value.to_le_bytes()),
        }
    }
}

/// Number of elements in one record for a register of `num_qubits` sites,
/// or `None` when the count overflows `usize`.
pub fn record_elements(num_qubits: usize) -> Option<usize> {
    let dim = checked_state_dimension(num_qubits)?;
    dim.checked_mul(dim)?
        .checked_add(dim)?
        .checked_add(num_qubits.checked_mul(3)?)
}

/// Byte stride of one record, or `None` when it overflows `usize`.
pub fn record_stride(num_qubits: usize, precision: Precision) -> Option<usize> {
    record_elements(num_qubits)?.checked_mul(precision.width())
}

/// Deserializes a dataset file for a fixed register size.
#[derive(Debug, Clone)]
pub struct Reader {
    num_qubits: usize,
    path: PathBuf,
    precision: Precision,
}

impl Reader {
    /// Creates a reader for `path` holding `num_qubits`-site instances.
    pub fn new(num_qubits: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            num_qubits,
            path: path.into(),
            precision: Precision::default(),
        }
    }

    /// Overrides the element width (double precision by default).
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Path of the file being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte stride of one record for this reader.
    ///
    /// Fails when the record size for `num_qubits` is not addressable.
    pub fn stride(&self) -> Result<usize, PhyError> {
        record_stride(self.num_qubits, self.precision).ok_or_else(|| {
            PhyError::Config(
                ErrorInfo::new("dataset-num-qubits", "record size overflows for this register")
                    .with_context("num_qubits", self.num_qubits.to_string())
                    .with_context("path", self.path.display().to_string()),
            )
        })
    }

    /// Number of whole records contained in a file of `file_size` bytes.
    ///
    /// A trailing partial record is not counted.
    pub fn instance_count(&self, file_size: u64) -> Result<usize, PhyError> {
        Ok((file_size / self.stride()? as u64) as usize)
    }

    /// Reads every whole record of the file into a [`Dataset`].
    ///
    /// Fails when the file cannot be opened or is empty. Trailing bytes that do
    /// not fill a whole record are ignored.
    pub fn read(&self) -> Result<Dataset, PhyError> {
        let stride = self.stride()?;
        let file = File::open(&self.path).map_err(|err| {
            PhyError::Io(
                ErrorInfo::new("dataset-open", format!("could not open dataset: {err}"))
                    .with_context("path", self.path.display().to_string()),
            )
        })?;
        let file_size = file
            .metadata()
            .map_err(|err| PhyError::io("dataset-metadata", &self.path, err))?
            .len();
        if file_size == 0 {
            return Err(PhyError::Format(
                ErrorInfo::new("dataset-empty", "stream ended before the first record")
                    .with_context("path", self.path.display().to_string()),
            ));
        }

        let num_instances = (file_size / stride as u64) as usize;
        let trailing = file_size % stride as u64;
        tracing::debug!(
            path = %self.path.display(),
            num_qubits = self.num_qubits,
            stride,
            num_instances,
            "reading dataset"
        );
        if trailing > 0 {
            tracing::trace!(trailing, "ignoring partial trailing record");
        }

        let mut stream = BufReader::new(file);
        let mut dataset = Dataset::with_capacity(self.num_qubits, num_instances);
        let mut buffer = if num_instances > 0 {
            vec![0u8; stride]
        } else {
            Vec::new()
        };
        for index in 0..num_instances {
            stream.read_exact(&mut buffer).map_err(|err| {
                PhyError::Io(
                    ErrorInfo::new("dataset-read", err.to_string())
                        .with_context("path", self.path.display().to_string())
                        .with_context("instance", index.to_string()),
                )
            })?;
            let (fields, values, wavefx) = self.decode_record(&buffer);
            dataset.push(fields, values, wavefx)?;
        }
        Ok(dataset)
    }

    fn decode_record(&self, bytes: &[u8]) -> (FieldRecord, DVector<f64>, DMatrix<f64>) {
        let n = self.num_qubits;
        let dim = state_dimension(n);
        let width = self.precision.width();
        let elements: Vec<f64> = bytes
            .chunks_exact(width)
            .map(|chunk| self.precision.decode(chunk))
            .collect();

        let fields = FieldRecord {
            coupling: elements[..n].to_vec(),
            transverse: elements[n..2 * n].to_vec(),
            longitudinal: elements[2 * n..3 * n].to_vec(),
        };
        let values_start = 3 * n;
        let wavefx_start = values_start + dim;
        let values = DVector::from_column_slice(&elements[values_start..wavefx_start]);
        let wavefx = DMatrix::from_column_slice(dim, dim, &elements[wavefx_start..]);
        (fields, values, wavefx)
    }
}
