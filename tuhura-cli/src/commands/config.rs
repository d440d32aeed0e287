use std::fs;

use anyhow::{Context, Result, bail};
use shared::config::ClientConfig;

/// Writes a default configuration file to the working directory.
///
/// # Errors
/// Returns an error if the format is unsupported or if writing the file fails.
pub fn generate_config(format: &str) -> Result<()> {
    let file_name = match format {
        "yaml" => "config.yaml",
        "json" => "config.json",
        _ => bail!("Unsupported format. Use 'yaml' or 'json'."),
    };

    let serialized = ClientConfig::with_defaults().to_format(format)?;
    fs::write(file_name, serialized.as_bytes())
        .with_context(|| format!("failed to write {file_name}"))?;

    println!("Configuration file '{file_name}' generated successfully.");
    Ok(())
}
