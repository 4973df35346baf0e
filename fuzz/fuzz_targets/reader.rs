#![no_main]

use libfuzzer_sys::fuzz_target;

use miocsv::ReaderBuilder;

fuzz_target!(|data: &[u8]| {
    let mut reader = ReaderBuilder::with_capacity(16).from_reader(data);

    while reader.read_row().unwrap().is_some() {}
});
