use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{ENV_CONFIG, ENV_DB_PATH, ENV_HOST, ENV_PORT};

#[derive(Parser)]
#[command(name = "hbc")]
#[command(version, about = "OData-style REST server for NYC 311 datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// SQLite database file (defaults to the data directory)
    #[arg(long, global = true, env = ENV_DB_PATH)]
    pub db_path: Option<String>,

    /// Largest $top a client may request
    #[arg(long, global = true)]
    pub max_top: Option<usize>,

    /// $top applied when a client gives none
    #[arg(long, global = true)]
    pub default_top: Option<usize>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database files). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub db_path: Option<String>,
    pub max_top: Option<usize>,
    pub default_top: Option<usize>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            db_path: cli.db_path,
            max_top: cli.max_top,
            default_top: cli.default_top,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    (cli.into(), command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from([
            "hbc",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
            "--db-path",
            "./hbc.db",
            "--max-top",
            "50",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        let config = CliConfig::from(cli);
        assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.db_path.as_deref(), Some("./hbc.db"));
        assert_eq!(config.max_top, Some(50));
        assert_eq!(config.default_top, None);
    }

    #[test]
    fn test_parse_prune_command() {
        let cli = Cli::try_parse_from(["hbc", "system", "prune", "--yes"]).unwrap();
        match cli.command {
            Some(Commands::System {
                command: SystemCommands::Prune { yes },
            }) => assert!(yes),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["hbc", "--port", "99999"]).is_err());
    }
}
