#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::io::Read;

use anyhow::{anyhow, Context, Result};
use log::info;
use passkey_synth::{
    response::registration_options_from_bytes, CredentialGenerator, Settings, VERSION,
};
use serde_json::Map;

const USAGE: &str = "usage: passkey-synth [OPTIONS_FILE|-]";

/// Where the options response is read from
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Help,
    Stdin,
    File(&'a str),
}

impl<'a> Input<'a> {
    fn from_arg(arg: Option<&'a str>) -> Self {
        match arg {
            None | Some("-") => Input::Stdin,
            Some("-h" | "--help") => Input::Help,
            Some(path) => Input::File(path),
        }
    }
}

fn main() -> Result<()> {
    let arg = std::env::args().nth(1);
    let input = Input::from_arg(arg.as_deref());
    if input == Input::Help {
        println!("{USAGE}");
        return Ok(());
    }

    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = Settings::load().map_err(|e| anyhow!("Failed to load settings: {e}"))?;
    info!("passkey-synth {VERSION}");

    let body = read_input(&input)?;
    let (options, format) =
        registration_options_from_bytes(&body).context("Failed to read registration options")?;
    info!(
        "Registration options received as {format} for relying party {}",
        options.options.rp.id
    );

    let generator = CredentialGenerator::new(settings.attestation);
    let generated = generator
        .generate_for_options(&options)
        .context("Failed to generate credential")?;

    let payload = CredentialGenerator::registration_payload(&options, generated.record, Map::new());
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn read_input(input: &Input<'_>) -> Result<Vec<u8>> {
    match input {
        Input::File(path) => std::fs::read(path).with_context(|| format!("Failed to read {path}")),
        Input::Stdin | Input::Help => {
            let mut body = Vec::new();
            std::io::stdin()
                .read_to_end(&mut body)
                .context("Failed to read options from stdin")?;
            Ok(body)
        }
    }
}
