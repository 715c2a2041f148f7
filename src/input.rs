use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

/// A source of lookup targets that can be either a file or stdin.
#[derive(Default, Clone, Debug, PartialEq)]
pub enum FileOrStdin {
    /// Targets listed in a file.
    File(Utf8PathBuf),
    /// Targets piped on stdin.
    #[default]
    Stdin,
}

impl fmt::Display for FileOrStdin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrStdin::File(path) => write!(f, "{}", path),
            FileOrStdin::Stdin => write!(f, "<stdin>"),
        }
    }
}

impl FileOrStdin {
    /// Create a new FileOrStdin from a path.
    ///
    /// If the path is "-", stdin is used.
    pub fn from_path(path: Utf8PathBuf) -> Self {
        if path.as_str() == "-" {
            FileOrStdin::Stdin
        } else {
            FileOrStdin::File(path)
        }
    }

    /// Read every target listed in this source.
    pub fn targets(&self) -> Result<Vec<String>> {
        match self {
            FileOrStdin::File(path) => {
                let file =
                    File::open(path).with_context(|| format!("failed to open file: {}", path))?;
                read_targets(BufReader::new(file))
                    .with_context(|| format!("failed to read file: {}", path))
            }
            FileOrStdin::Stdin => {
                read_targets(io::stdin().lock()).context("failed to read from stdin")
            }
        }
    }
}

/// Collect one target per line.
///
/// Surrounding whitespace is trimmed; blank lines and `#` comments are skipped.
pub fn read_targets<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut targets = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let target = line.trim();
        if target.is_empty() || target.starts_with('#') {
            continue;
        }
        targets.push(target.to_string());
    }
    Ok(targets)
}
