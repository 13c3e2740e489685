//! Entry point: replay a script of file system commands, one per line,
//! against disk image files.

use anyhow::Context;
use clap::Parser;
use minifs::shell::Shell;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

/// Simulated block file system driver.
#[derive(Parser)]
#[command(name = "minifs", version, about)]
struct Args {
    /// Path to the command script.
    input: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.input)
        .with_context(|| format!("cannot open input file {}", args.input))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut shell = Shell::new(args.input.clone());
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed reading {}", args.input))?;
        shell.execute_line(&line, i + 1, &mut out);
    }
    out.flush()?;
    Ok(())
}
