use std::fs::File;

use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    /// Path to target CSV file
    path: String,
}

impl Args {
    fn delimiter(&self) -> u8 {
        if self.path.ends_with(".tsv") {
            b'\t'
        } else {
            b','
        }
    }
}

const DEFAULT_CAPACITY: usize = 1024 * (1 << 10);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let delimiter = args.delimiter();
    let file = File::open(&args.path)?;

    let mut reader = miocsv::ReaderBuilder::with_capacity(DEFAULT_CAPACITY)
        .delimiter(delimiter)
        .from_reader(file);

    let mut writer =
        miocsv::Writer::with_capacity(std::io::stdout(), DEFAULT_CAPACITY, delimiter);

    while let Some(row) = reader.read_row()? {
        writer.write_row(&row)?;
    }

    writer.flush()?;

    for diagnostic in reader.take_diagnostics() {
        eprintln!("{}", diagnostic);
    }

    Ok(())
}
