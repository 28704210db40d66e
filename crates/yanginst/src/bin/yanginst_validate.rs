//! `yanginst-validate`: check an instance-data file against a schema.
//!
//! Usage:
//!   yanginst-validate <schema.json> <data.json>
//!   yanginst-validate --settings <yanginst.toml>
//!
//! Prints one error-log entry per line. Exits with 1 when the data is
//! invalid or cannot be loaded.

use std::path::Path;

use yanginst::cli::{setup_logging, validate_files, validate_with_settings, CliError};

fn usage() -> CliError {
    CliError::Usage(
        "usage: yanginst-validate <schema.json> <data.json> | --settings <file>".to_string(),
    )
}

fn main() {
    setup_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.as_slice() {
        [flag, settings] if flag == "--settings" => validate_with_settings(Path::new(settings)),
        [schema, data] => validate_files(Path::new(schema), Path::new(data)),
        _ => Err(usage()),
    };
    match result {
        Ok(log) if log.is_empty() => {}
        Ok(log) => {
            for entry in &log {
                println!("{entry}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
