pub mod completion;
pub mod config;
pub mod register;
pub mod session;

use std::io::{self, Write};

use anyhow::{Context, Result};

/// Returns `value` if given, otherwise asks for it on stdin.
pub(crate) fn prompt_or(value: Option<String>, message: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("failed to read from stdin")?;
    Ok(input.trim().to_string())
}

/// Like [`prompt_or`] without echoing the input.
pub(crate) fn prompt_secret_or(value: Option<String>, message: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => rpassword::prompt_password(message).context("failed to read password"),
    }
}
