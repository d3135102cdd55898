use std::io::{IsTerminal, Read};

use anyhow::{Context, bail};
use common::embed::EmbedValidator;
use console::style;

pub fn check_embed(code: Option<String>) -> anyhow::Result<()> {
    let code = match code {
        Some(code) => code,
        None => {
            let mut stdin = std::io::stdin();
            if stdin.is_terminal() {
                eprintln!("Paste embed markup, then press Ctrl-D:");
            }
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .context("Failed to read markup from stdin")?;
            buf
        }
    };

    let result = EmbedValidator::default().check(&code);
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_valid {
        bail!(
            "{}",
            style(result.error.unwrap_or_else(|| "Invalid embed".into())).red()
        );
    }
    Ok(())
}
