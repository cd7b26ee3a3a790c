use crate::config::generate::generate_starter_config;
use crate::config::{load_config, user_config_path, Overrides};
use std::fs;
use std::path::{Path, PathBuf};

/// Print a starter config, or write it to `~/.config/errwatch/config.yml`
/// (falling back to `/etc/errwatch/config.yml`).
pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path =
        user_config_path().unwrap_or_else(|| PathBuf::from("/etc/errwatch/config.yml"));
    write_config(&config_content, &config_path)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

/// Write config text to `path`, refusing to overwrite an existing file.
pub fn write_config(config_content: &str, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err(format!(
            "Config file already exists at {}. Remove it first or use --stdout to print the config",
            path.display()
        )
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, config_content)?;
    Ok(())
}

/// Check that the config (plus command line overrides) is complete.
pub fn validate(
    config_path: Option<PathBuf>,
    overrides: &Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    match &config_path {
        Some(path) => println!("Validating config file: {}", path.display()),
        None => println!("No config file found, validating command line settings"),
    }

    load_config(config_path.as_deref(), overrides)?;
    println!("✓ Config is valid");
    Ok(())
}
