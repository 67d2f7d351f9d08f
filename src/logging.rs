//! Log setup: `timestamp - LEVEL - message` lines to stdout and a log file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file '{}': {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Logger already initialized: {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Writes every line to stdout and to an append-only file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

/// Install the global logger. `RUST_LOG` takes precedence over `level`.
pub fn init(log_file: &Path, level: &str) -> Result<(), LoggingError> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LoggingError::Open {
            path: log_file.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|source| LoggingError::Open {
            path: log_file.to_path_buf(),
            source,
        })?;

    Builder::from_env(Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee { file })))
        .try_init()?;
    Ok(())
}
