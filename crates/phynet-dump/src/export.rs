use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use phynet_core::{Dataset, PhyError};

/// Literal header line of the field export.
pub const INPUT_HEADER: &str = "J[1], Bx[1], Bz[1]... J[n], Bx[n], Bz[n]";
/// Literal header line of the wavefunction export.
pub const OUTPUT_HEADER: &str = "c[1], c[2], c[3]... c[n] ";

fn csv_error(code: &str, path: &Path, err: impl ToString) -> PhyError {
    PhyError::io(code, path, err)
}

/// Writes the fields of every instance to `input_path` and the flattened
/// eigenvector matrices to `output_path`.
///
/// Each row starts with the 1-based instance index. Field rows interleave
/// `J[j], Bx[j], Bz[j]` per site; wavefunction rows follow storage order, so
/// eigenvector `k` occupies columns `k*dim + 1 ..= (k+1)*dim`.
pub fn write_csv(dataset: &Dataset, input_path: &Path, output_path: &Path) -> Result<(), PhyError> {
    let mut inputs = open_with_header(input_path, INPUT_HEADER)?;
    for instance in dataset.iter() {
        let fields = instance.fields;
        let mut row = Vec::with_capacity(1 + 3 * fields.num_qubits());
        row.push((instance.index + 1).to_string());
        for j in 0..fields.num_qubits() {
            row.push(fields.coupling[j].to_string());
            row.push(fields.transverse[j].to_string());
            row.push(fields.longitudinal[j].to_string());
        }
        inputs
            .write_record(&row)
            .map_err(|err| csv_error("csv-write", input_path, err))?;
    }
    inputs
        .flush()
        .map_err(|err| csv_error("csv-write", input_path, err))?;

    let mut outputs = open_with_header(output_path, OUTPUT_HEADER)?;
    for instance in dataset.iter() {
        let mut row = Vec::with_capacity(1 + instance.wavefx.len());
        row.push((instance.index + 1).to_string());
        row.extend(instance.wavefx.as_slice().iter().map(f64::to_string));
        outputs
            .write_record(&row)
            .map_err(|err| csv_error("csv-write", output_path, err))?;
    }
    outputs
        .flush()
        .map_err(|err| csv_error("csv-write", output_path, err))?;
    Ok(())
}

fn open_with_header(path: &Path, header: &str) -> Result<csv::Writer<BufWriter<File>>, PhyError> {
    let file = File::create(path).map_err(|err| csv_error("csv-create", path, err))?;
    let mut buffered = BufWriter::new(file);
    writeln!(buffered, "{header}").map_err(|err| csv_error("csv-write", path, err))?;
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(buffered))
}
