//! JSON reports

use crate::output::OutputResult;
use serde::Serialize;
use std::path::Path;

/// Renders any report value as pretty-printed JSON
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes a report value as pretty-printed JSON to `output_path`
pub fn write_json_report<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> OutputResult<()> {
    let json = render_json(value)?;
    std::fs::write(output_path, json)?;
    Ok(())
}
