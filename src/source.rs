use std::fs;
use std::io;
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

use snafu::Snafu;
use snafu::prelude::*;

#[derive(Debug, Snafu)]
pub enum SourceError {
    #[snafu(display("Cannot read {}: {source}", path.display()))]
    Io { path: PathBuf, source: io::Error },

    #[snafu(display("Expected number in {}: {source}", path.display()))]
    Parse { path: PathBuf, source: ParseFloatError },
}

/// Reads a single number from a file, as found under /sys.
pub fn read_value(path: &Path, scale: f64) -> Result<f64, SourceError> {
    let raw = fs::read_to_string(path)
        .context(IoSnafu { path })?;
    let value = raw.trim().parse::<f64>()
        .context(ParseSnafu { path })?;
    Ok(value * scale)
}

/// Any non zero number means on.
pub fn read_flag(path: &Path, inverted: bool) -> Result<bool, SourceError> {
    let value = read_value(path, 1.0)?;
    Ok((value != 0.0) != inverted)
}

pub fn write_flag(path: &Path, state: bool) -> Result<(), SourceError> {
    fs::write(path, if state { "1" } else { "0" })
        .context(IoSnafu { path })
}
