use std::io::{self, Write};

use phynet_core::Dataset;

const RULE: &str = "--------------------------------------------------------------------";

/// Renders a human readable dump of every instance into `out`.
pub fn render<W: Write>(dataset: &Dataset, out: &mut W) -> io::Result<()> {
    for instance in dataset.iter() {
        writeln!(
            out,
            "--------------------------- INSTANCE {} ---------------------------",
            instance.index + 1
        )?;
        write_row(out, "J: ", &instance.fields.coupling)?;
        write_row(out, "Bx:", &instance.fields.transverse)?;
        write_row(out, "Bz:", &instance.fields.longitudinal)?;
        writeln!(out)?;

        writeln!(out, "Eigenvalues:")?;
        let values: Vec<f64> = instance.values.iter().copied().collect();
        write_row(out, "", &values)?;
        writeln!(out)?;

        writeln!(out, "Eigenvectors:")?;
        for row in instance.wavefx.row_iter() {
            let entries: Vec<f64> = row.iter().copied().collect();
            write_row(out, "", &entries)?;
        }
        writeln!(out, "{RULE}")?;
        writeln!(out)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Prints the dump to standard output.
pub fn print(dataset: &Dataset) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    render(dataset, &mut lock)
}

fn write_row<W: Write>(out: &mut W, label: &str, values: &[f64]) -> io::Result<()> {
    write!(out, "{label}")?;
    for value in values {
        write!(out, " {value:>13.6e}")?;
    }
    writeln!(out)
}
