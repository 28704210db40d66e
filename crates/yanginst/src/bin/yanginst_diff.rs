//! `yanginst-diff`: line diff of two instance-data files.
//!
//! Usage:
//!   yanginst-diff <schema.json> <a.json> <b.json> [--context <n>]
//!
//! Both files are decoded against the schema and compared in their canonical
//! encoding, so member order and whitespace of the inputs do not matter.

use std::path::Path;

use yanginst::cli::{diff_files, setup_logging, CliError};

fn parse_args(args: &[String]) -> Result<(&str, &str, &str, Option<usize>), CliError> {
    let usage =
        || CliError::Usage("usage: yanginst-diff <schema> <a> <b> [--context <n>]".to_string());
    match args {
        [schema, a, b] => Ok((schema.as_str(), a.as_str(), b.as_str(), None)),
        [schema, a, b, flag, n] if flag == "--context" => {
            let n = n.parse().map_err(|_| usage())?;
            Ok((schema.as_str(), a.as_str(), b.as_str(), Some(n)))
        }
        _ => Err(usage()),
    }
}

fn main() {
    setup_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(|(schema, a, b, context)| {
        diff_files(Path::new(schema), Path::new(a), Path::new(b), context)
    });
    match result {
        Ok(out) => print!("{out}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
