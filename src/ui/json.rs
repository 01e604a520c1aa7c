//! JSON output for `--json`
//!
//! Every command writes exactly one JSON document to stdout. Logs go to
//! stderr, so stdout stays parseable.

use std::io::{self, Write};

use serde::Serialize;

/// Write one pretty-printed document followed by a newline.
pub fn write_document<T: Serialize, W: Write>(out: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    out.write_all(json.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

pub fn emit<T: Serialize>(value: &T) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_document(&mut out, value)
}
