use veribox::Veribox;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    veribox_common::logging::init();

    let config = match find_config_file()? {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                anyhow::anyhow!("Failed to read config from {}: {}", path.display(), e)
            })?;
            tracing::info!(path = %path.display(), "loaded configuration");
            Veribox::from_config_str(&raw)?
        }
        None => {
            tracing::warn!("no configuration file found, using defaults (simulation mode)");
            Veribox::default()
        }
    };

    config.run().await
}

/// Find the configuration file using the following precedence:
/// 1. `VERIBOX_CONFIG` environment variable
/// 2. ./veribox.config.toml (current working directory)
/// 3. /etc/veribox/veribox.config.toml (system-wide config)
///
/// Returns `None` when nothing is found, in which case built-in defaults
/// apply.
fn find_config_file() -> anyhow::Result<Option<std::path::PathBuf>> {
    if let Ok(env_path) = std::env::var("VERIBOX_CONFIG") {
        let path = std::path::PathBuf::from(env_path);
        if path.exists() {
            return Ok(Some(path));
        }
        anyhow::bail!(
            "VERIBOX_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = [
        std::path::PathBuf::from("./veribox.config.toml"),
        std::path::PathBuf::from("/etc/veribox/veribox.config.toml"),
    ];

    Ok(default_paths.iter().find(|path| path.exists()).cloned())
}
