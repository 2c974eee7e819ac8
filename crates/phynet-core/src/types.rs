use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PhyError};

/// Returns the Hilbert-space dimension `2^num_qubits` of a qubit register.
///
/// Callers holding an untrusted register size should go through
/// [`checked_state_dimension`] first.
pub fn state_dimension(num_qubits: usize) -> usize {
    1usize << num_qubits
}

/// Returns `2^num_qubits`, or `None` when it does not fit in `usize`.
pub fn checked_state_dimension(num_qubits: usize) -> Option<usize> {
    u32::try_from(num_qubits)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
}

/// Hamiltonian parameters for a single chain instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Nearest-neighbour `J` couplings, one per site.
    pub coupling: Vec<f64>,
    /// Transverse `Bx` fields, one per site.
    pub transverse: Vec<f64>,
    /// Longitudinal `Bz` fields, one per site.
    pub longitudinal: Vec<f64>,
}

impl FieldRecord {
    /// Creates an all-zero record for `num_qubits` sites.
    pub fn zeros(num_qubits: usize) -> Self {
        Self {
            coupling: vec![0.0; num_qubits],
            transverse: vec![0.0; num_qubits],
            longitudinal: vec![0.0; num_qubits],
        }
    }

    /// Builds a record from the three per-site sequences, which must share a length.
    pub fn new(
        coupling: Vec<f64>,
        transverse: Vec<f64>,
        longitudinal: Vec<f64>,
    ) -> Result<Self, PhyError> {
        let n = coupling.len();
        if transverse.len() != n {
            return Err(PhyError::shape(
                "field-length",
                "transverse field length differs from coupling length",
                n,
                transverse.len(),
            ));
        }
        if longitudinal.len() != n {
            return Err(PhyError::shape(
                "field-length",
                "longitudinal field length differs from coupling length",
                n,
                longitudinal.len(),
            ));
        }
        Ok(Self {
            coupling,
            transverse,
            longitudinal,
        })
    }

    /// Number of sites described by the record.
    pub fn num_qubits(&self) -> usize {
        self.coupling.len()
    }

    /// Flattens the record into the network input layout
    /// `[J_1..J_n, Bx_1..Bx_n, Bz_1..Bz_n]`.
    pub fn to_input(&self) -> Vec<f64> {
        let mut input = Vec::with_capacity(3 * self.num_qubits());
        input.extend_from_slice(&self.coupling);
        input.extend_from_slice(&self.transverse);
        input.extend_from_slice(&self.longitudinal);
        input
    }

    /// Inverse of [`FieldRecord::to_input`].
    pub fn from_input(input: &[f64]) -> Result<Self, PhyError> {
        if input.len() % 3 != 0 {
            return Err(PhyError::Shape(
                ErrorInfo::new("field-input", "input length is not a multiple of three")
                    .with_context("len", input.len().to_string()),
            ));
        }
        let n = input.len() / 3;
        Ok(Self {
            coupling: input[..n].to_vec(),
            transverse: input[n..2 * n].to_vec(),
            longitudinal: input[2 * n..].to_vec(),
        })
    }
}

/// Borrowed view of one dataset instance.
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    /// Position of the instance within the dataset.
    pub index: usize,
    /// Hamiltonian parameters.
    pub fields: &'a FieldRecord,
    /// Reference eigenvalues, ascending.
    pub values: &'a DVector<f64>,
    /// Reference eigenvectors; column `k` belongs to eigenvalue `k`.
    pub wavefx: &'a DMatrix<f64>,
}

impl Instance<'_> {
    /// Returns the reference eigenvector for eigenvalue `k` as an owned vector.
    pub fn eigenstate(&self, k: usize) -> Vec<f64> {
        self.wavefx.column(k).iter().copied().collect()
    }

    /// Returns the reference ground state (column 0).
    pub fn ground_state(&self) -> Vec<f64> {
        self.eigenstate(0)
    }
}

/// Index-aligned collection of instances sharing one register size.
///
/// Every push is validated so `fields`, `values` and `wavefx` always have the
/// same length, every value vector has `dim` entries and every eigenvector
/// matrix is `dim x dim`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    num_qubits: usize,
    fields: Vec<FieldRecord>,
    values: Vec<DVector<f64>>,
    wavefx: Vec<DMatrix<f64>>,
}

impl Dataset {
    /// Creates an empty dataset for registers of `num_qubits` sites.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            fields: Vec::new(),
            values: Vec::new(),
            wavefx: Vec::new(),
        }
    }

    /// Creates an empty dataset with room for `capacity` instances.
    pub fn with_capacity(num_qubits: usize, capacity: usize) -> Self {
        Self {
            num_qubits,
            fields: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            wavefx: Vec::with_capacity(capacity),
        }
    }

    /// Appends an instance after checking its shape against the dataset.
    pub fn push(
        &mut self,
        fields: FieldRecord,
        values: DVector<f64>,
        wavefx: DMatrix<f64>,
    ) -> Result<(), PhyError> {
        let dim = self.dim();
        if fields.num_qubits() != self.num_qubits {
            return Err(PhyError::shape(
                "instance-fields",
                "field record size does not match dataset register",
                self.num_qubits,
                fields.num_qubits(),
            ));
        }
        if values.len() != dim {
            return Err(PhyError::shape(
                "instance-values",
                "eigenvalue vector length does not match 2^num_qubits",
                dim,
                values.len(),
            ));
        }
        if wavefx.nrows() != dim || wavefx.ncols() != dim {
            return Err(PhyError::Shape(
                ErrorInfo::new("instance-wavefx", "eigenvector matrix must be dim x dim")
                    .with_context("dim", dim.to_string())
                    .with_context("rows", wavefx.nrows().to_string())
                    .with_context("cols", wavefx.ncols().to_string()),
            ));
        }
        self.fields.push(fields);
        self.values.push(values);
        self.wavefx.push(wavefx);
        Ok(())
    }

    /// Number of sites per instance.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Hilbert-space dimension of every instance.
    pub fn dim(&self) -> usize {
        state_dimension(self.num_qubits)
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the dataset holds no instances.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field records in instance order.
    pub fn fields(&self) -> &[FieldRecord] {
        &self.fields
    }

    /// Reference eigenvalues in instance order.
    pub fn values(&self) -> &[DVector<f64>] {
        &self.values
    }

    /// Reference eigenvector matrices in instance order.
    pub fn wavefx(&self) -> &[DMatrix<f64>] {
        &self.wavefx
    }

    /// Returns a view of instance `index`, if present.
    pub fn instance(&self, index: usize) -> Option<Instance<'_>> {
        Some(Instance {
            index,
            fields: self.fields.get(index)?,
            values: self.values.get(index)?,
            wavefx: self.wavefx.get(index)?,
        })
    }

    /// Iterates over all instances in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Instance<'_>> + '_ {
        self.fields
            .iter()
            .zip(self.values.iter())
            .zip(self.wavefx.iter())
            .enumerate()
            .map(|(index, ((fields, values), wavefx))| Instance {
                index,
                fields,
                values,
                wavefx,
            })
    }
}
