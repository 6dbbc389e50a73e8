#![no_main]

use glossa::glossary::{SourceFormat, parse_glossary_filename};
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_glossary_filename(Path::new(text));

    // Parsed rows must render and re-parse without panicking
    for format in SourceFormat::ALL {
        if let Ok(rows) = format.parse(text) {
            if let Ok(rendered) = format.render(&rows) {
                let _ = format.parse(&rendered);
            }
        }
    }
});
