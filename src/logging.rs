use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::LoggingConfig;

pub const LOG_FILE_NAME: &str = "pcdiag.log";

/// Where log lines go. The dashboard owns the terminal, so it logs to a file.
#[derive(Debug, Clone)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
}

/// `RUST_LOG` wins over the configured level when set.
pub fn init(config: &LoggingConfig, sink: LogSink) -> Result<()> {
    let directive = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => config.level.clone(),
    };
    let filter = parse_filter(&directive)?;

    match sink {
        LogSink::Stderr => install(filter, config.json, std::io::stderr, true),
        LogSink::File(path) => {
            ensure_parent_dir(&path)?;
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            install(filter, config.json, Mutex::new(file), false)
        }
    }
}

pub fn parse_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| eyre!("invalid log filter `{directive}`: {e}"))
}

fn install<W>(filter: EnvFilter, json: bool, writer: W, ansi: bool) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(writer);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_levels_and_targets() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("pcdiag=debug,tokio=warn").is_ok());
    }

    #[test]
    fn rejects_garbage_directive() {
        assert!(parse_filter("pcdiag=notalevel").is_err());
    }
}
