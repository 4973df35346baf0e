#![no_main]

use libfuzzer_sys::fuzz_target;

use miocsv::{Reader, ReaderBuilder};

fuzz_target!(|data: &[u8]| {
    let mapped = Reader::from_bytes(data)
        .into_rows()
        .collect::<miocsv::Result<Vec<_>>>()
        .unwrap();

    let streamed = ReaderBuilder::with_capacity(7)
        .from_reader(data)
        .into_rows()
        .collect::<miocsv::Result<Vec<_>>>()
        .unwrap();

    assert_eq!(mapped, streamed);
});
