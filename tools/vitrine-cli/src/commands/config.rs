//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let config = &ctx.config;

    ctx.output.info("[paging]");
    ctx.output.kv("initial", &config.paging.initial.to_string());
    ctx.output.kv("subsequent", &config.paging.subsequent.to_string());

    ctx.output.info("[fetch]");
    ctx.output.kv("latency_ms", &config.fetch.latency_ms.to_string());
    if let Some(limit) = config.fetch.max_concurrent {
        ctx.output.kv("max_concurrent", &limit.to_string());
    }
    ctx.output.kv("timeout_ms", &config.fetch.timeout_ms.to_string());
    ctx.output.kv("max_retries", &config.fetch.max_retries.to_string());

    ctx.output.info("[cache]");
    ctx.output.kv("stale_time_ms", &config.cache.stale_time_ms.to_string());
    ctx.output.kv("gc_time_ms", &config.cache.gc_time_ms.to_string());

    ctx.output.info("[source]");
    match (&config.source.catalog_path, &config.source.remote_url) {
        (Some(path), _) => ctx.output.kv("catalog_path", path),
        (None, Some(url)) => ctx.output.kv("remote_url", url),
        (None, None) => ctx.output.kv("catalog", "demo"),
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let errors = ctx.config.validate();
    if errors.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }
    bail!("Configuration has {} error(s)", errors.len());
}
