//! pyrelease - zero configuration releases for single-file Python modules.
//!
//! This binary inspects a Python module, writes its packaging files, builds
//! the distributions and uploads them to PyPI.

use pyrelease::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Run CLI and get exit code; logging is set up from the arguments
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
