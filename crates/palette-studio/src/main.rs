mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use palette_engine::logging::{LoggingConfig, init_logging};
use palette_ui::config::PaletteConfig;

#[derive(Debug, Parser)]
#[command(name = "palette-studio")]
#[command(about = "Run a scripted hover session against headless palettes", long_about = None)]
struct Args {
    /// TOML file with palette settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override one setting, e.g. `popup.duration_ms=100`. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    set: Vec<(String, String)>,

    /// Log filter, same syntax as RUST_LOG
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

fn parse_key_val(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_owned(), value.to_owned())),
        _ => Err(format!("expected key=value, got '{pair}'")),
    }
}

fn load_config(args: &Args) -> Result<PaletteConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            PaletteConfig::from_toml_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => PaletteConfig::default(),
    };
    for (key, value) in &args.set {
        config
            .apply_override(key, value)
            .with_context(|| format!("--set {key}={value}"))?;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let config = load_config(&args)?;

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          PALETTE STUDIO v0.1           ║");
    println!("  ║   headless toolkit  ·  scripted hover  ║");
    println!("  ╠════════════════════════════════════════╣");
    println!("  ║  popup {:>5} ms   secondary {:>5} ms   ║", config.popup.duration_ms, config.secondary.duration_ms);
    println!("  ║  popdown {:>5} ms                      ║", config.popdown.duration_ms);
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let transcript = session::run(config, &session::default_script())?;
    for line in transcript {
        println!("  {line}");
    }
    println!();
    Ok(())
}
