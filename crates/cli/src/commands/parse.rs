//! Parse a markup file and print its canonical form

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Parse a markup file and print it in canonical form
#[derive(Parser, Debug)]
pub struct Parse {
    /// Markup file to parse
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the canonical text to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl Parse {
    pub fn execute(self) -> Result<()> {
        let root = markup::parse_file(&self.file)?;

        match self.output {
            Some(path) => root
                .write_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?,
            None => print!("{}", root.to_text()),
        }
        Ok(())
    }
}
