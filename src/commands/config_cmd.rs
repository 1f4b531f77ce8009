use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::{CommandError, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# larder configuration

# Larder API server
api_url: http://localhost:8080

# Where the auth token is kept (default: platform data dir + /larder)
# data_dir: ~/.local/share/larder

# Request timeout in seconds
timeout_secs: 30

# Page size for list commands
per_page: 10
"#;

impl ConfigCommand {
    pub fn run(&self, config: &Config, config_path: Option<PathBuf>) -> Result<(), CommandError> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Table => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                config_path
                                    .unwrap_or_else(Config::default_config_path)
                                    .display()
                            );
                        }
                        println!();

                        println!("api_url: {}", config.api_url.value);
                        println!("  source: {}", config.api_url.source);
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("timeout_secs: {}", config.timeout_secs.value);
                        println!("  source: {}", config.timeout_secs.source);
                        println!();

                        println!("per_page: {}", config.per_page.value);
                        println!("  source: {}", config.per_page.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'larder config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_loadable_config() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");
        let config = Config::load(Some(path.clone())).unwrap();

        let cmd = ConfigCommand {
            command: ConfigSubcommand::Init,
        };
        cmd.run(&config, Some(path.clone())).unwrap();
        assert!(path.exists());

        let loaded = Config::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.config_file, Some(path));
        assert_eq!(loaded.per_page.value, 10);
        assert_eq!(loaded.per_page.source, ConfigSource::File);
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "per_page: 40\n").unwrap();
        let config = Config::load(Some(path.clone())).unwrap();

        let cmd = ConfigCommand {
            command: ConfigSubcommand::Init,
        };
        cmd.run(&config, Some(path.clone())).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "per_page: 40\n");
    }
}
