//! Reader and writer for the flat binary dataset format, plus text and CSV
//! exporters.
//!
//! A dataset file is a headerless sequence of fixed-stride records. For a
//! register of `n` qubits and `dim = 2^n`, each record holds `n` couplings,
//! `n` transverse fields, `n` longitudinal fields, `dim` eigenvalues and the
//! `dim x dim` eigenvector matrix in column-major order, all as little-endian
//! floating point elements of one width.

pub mod dump;
pub mod export;
pub mod reader;
pub mod writer;

pub use dump::{print, render};
pub use export::{write_csv, INPUT_HEADER, OUTPUT_HEADER};
pub use reader::{record_stride, Precision, Reader};
pub use writer::DatasetWriter;
