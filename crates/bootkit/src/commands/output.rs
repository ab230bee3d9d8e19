//! Machine-readable output rendering

use anyhow::Result;
use bootkit_core::OutputFormat;
use serde::Serialize;

/// Render `value` as JSON or YAML, or `None` for human output.
pub fn render<T: Serialize>(format: OutputFormat, value: &T) -> Result<Option<String>> {
    let rendered = match format {
        OutputFormat::Json => Some(format!("{}\n", serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Some(serde_yaml::to_string(value)?),
        OutputFormat::Human => None,
    };
    Ok(rendered)
}

/// Print `value` in the requested machine format, else the `human` text.
pub fn emit<T, F>(format: OutputFormat, value: &T, human: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match render(format, value)? {
        Some(text) => print!("{text}"),
        None => println!("{}", human()),
    }
    Ok(())
}
