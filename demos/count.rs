use clap::Parser;
use csv::{ByteRecord, ReaderBuilder};

#[derive(Parser, Debug)]
struct Args {
    /// Path to target CSV file
    path: String,

    /// Whether to memory-map the file instead of streaming it
    #[arg(long)]
    mmap: bool,

    /// Whether to count using the csv crate instead, for comparison
    #[arg(long)]
    csv: bool,
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

fn count<T: miocsv::Tokenizer>(mut reader: miocsv::Reader<T>) -> anyhow::Result<u64> {
    let mut count: u64 = 0;

    while let Some(row) = reader.read_row()? {
        if !row.is_empty() {
            count += 1;
        }
    }

    for diagnostic in reader.diagnostics() {
        eprintln!("{}", diagnostic);
    }

    Ok(count)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let delimiter = args.delimiter();

    if args.csv {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .from_path(&args.path)?;

        let mut count: u64 = 0;
        let mut record = ByteRecord::new();

        while reader.read_byte_record(&mut record)? {
            count += 1;
        }

        println!("{}", count);

        return Ok(());
    }

    let mut builder = miocsv::ReaderBuilder::with_capacity(1024 * (1 << 10));
    builder.delimiter(delimiter);

    let count = if args.mmap {
        count(builder.from_path(&args.path)?)?
    } else {
        count(builder.from_reader(std::fs::File::open(&args.path)?))?
    };

    println!("{}", count);

    Ok(())
}
