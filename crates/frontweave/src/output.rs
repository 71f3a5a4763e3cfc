//! Stdout helpers for command output

use std::io::{self, Write};

use serde::Serialize;

/// Pretty-print a report as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(report: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(report)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}
