use clap::Parser;
use miocsv::{DictReader, Reader};

#[derive(Parser, Debug)]
struct Args {
    /// Path to target CSV file
    path: String,

    /// Names of the columns to print
    #[arg(required = true)]
    columns: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut reader = DictReader::new(Reader::from_path(&args.path)?)?;

    for column in args.columns.iter() {
        if !reader.fieldnames().contains(column) {
            anyhow::bail!("unknown column {:?}, expected one of: {}", column, reader.fieldnames());
        }
    }

    let mut writer = miocsv::Writer::from_writer(std::io::stdout());
    writer.write_row(&args.columns.iter().collect())?;

    while let Some(row) = reader.read_row()? {
        let mut selection = miocsv::Row::with_capacity(args.columns.len());

        for column in args.columns.iter() {
            selection.push_field(row.by_name(column).unwrap_or_default().to_string());
        }

        writer.write_row(&selection)?;
    }

    writer.flush()?;

    for diagnostic in reader.take_diagnostics() {
        eprintln!("{}", diagnostic);
    }

    Ok(())
}
