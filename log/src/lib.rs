use std::{fmt::Display, str::FromStr};

use anyhow::{Context, Result};
use backtrace::Backtrace;
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn};

/// Installs the global fmt subscriber.
///
/// An unknown `level_filter` is returned as an error. Installing twice is a
/// no-op, so callers (and tests) don't need to track whether it already ran.
pub fn init(display_level: &bool, level_filter: &str) -> Result<()> {
    let level_filter = LevelFilter::from_str(level_filter)
        .with_context(|| format!("Unknown log level filter '{level_filter}'"))?;

    let _ = tracing_subscriber::fmt()
        .with_level(*display_level)
        .with_max_level(level_filter)
        .try_init();

    Ok(())
}

pub fn trace<T: Display>(prefix: Option<&str>, msg: T) {
    trace!("{} {msg}", prefix.unwrap_or("🐾"));
}

pub fn debug<T: Display>(prefix: Option<&str>, msg: T) {
    debug!("{} {msg}", prefix.unwrap_or("🐞"));
}

pub fn info<T: Display>(prefix: Option<&str>, msg: T) {
    info!("{} {msg}", prefix.unwrap_or("📢"));
}

pub fn warn<T: Display>(prefix: Option<&str>, msg: T) {
    warn!("{} {msg}", prefix.unwrap_or("⚠️"));
}

pub fn error<T: Display>(prefix: Option<&str>, msg: T) {
    let prefix = prefix.unwrap_or("🚨");
    if backtrace_enabled() {
        error!("{prefix} {msg}\n{:?}", Backtrace::new());
    } else {
        error!("{prefix} {msg}");
    }
}

pub fn panic<T: Display>(prefix: Option<&str>, msg: T) -> ! {
    panic!("{} {msg}", prefix.unwrap_or("☠️"));
}

fn backtrace_enabled() -> bool {
    std::env::var("RUST_BACKTRACE").is_ok_and(|var| var == "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level_filter() {
        let err = init(&true, "loud").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn init_twice_is_harmless() {
        assert!(init(&false, "debug").is_ok());
        assert!(init(&true, "info").is_ok());
    }
}
