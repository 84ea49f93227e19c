//! ahk-lint: validate an AutoHotkey script against the v2 dialect.
//!
//! - `ahk-lint script.ahk` prints the report; exit 0 when valid, 1 when not
//! - `ahk-lint --fix script.ahk` also prints the verified rewrite
//! - `ahk-lint --fix -o fixed.ahk script.ahk` writes the rewrite instead
//!
//! Exit 3 means the input could not be read or the output not written.

use ahk_lint::{create_renderer, Strictness, Validator, ValidatorConfig};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EXIT_INVALID: u8 = 1;
const EXIT_IO: u8 = 3;

#[derive(Parser)]
#[command(
    name = "ahk-lint",
    version,
    about = "Check AutoHotkey scripts for v2 conformance and fix legacy command syntax"
)]
struct Cli {
    /// Script to check. Use - to read from stdin.
    file: PathBuf,

    /// Which findings fail validation: permissive, standard, strict
    #[arg(short = 's', long, default_value = "standard")]
    strictness: Strictness,

    /// Report format: text (default), json
    #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Build a rewrite candidate and verify it before printing
    #[arg(long)]
    fix: bool,

    /// Write the rewrite candidate to this file instead of printing it
    #[arg(short = 'o', long, requires = "fix")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_IO)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let text = read_input(&cli.file)?;
    debug!(file = %cli.file.display(), bytes = text.len(), "input read");

    let validator = Validator::new(ValidatorConfig::with_strictness(cli.strictness));
    let report = if cli.fix {
        validator.validate_with_fix(&text)
    } else {
        validator.validate(&text)
    };

    let renderer = create_renderer(&cli.format)?;
    print!("{}", renderer.render(&report)?);

    if let Some(ref fix) = report.fix {
        match cli.output {
            Some(ref path) => {
                fs::write(path, &fix.text)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("wrote {} ({} fixes)", path.display(), fix.applied.len());
            }
            // The JSON report already carries the candidate.
            None if cli.format == "text" => {
                println!("--- auto-fix preview ---");
                print!("{}", fix.text);
                if !fix.text.ends_with('\n') {
                    println!();
                }
            }
            None => {}
        }
    }

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    })
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(input);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
