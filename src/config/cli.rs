use crate::config::AppConfig;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "contact-intake")]
#[command(about = "Validate and store contact records from a web form or a CSV file")]
pub struct CliArgs {
    /// Path to the TOML configuration file (optional; DB_* variables are used without it)
    #[arg(short, long, global = true, default_value = "contact-intake.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the intake form and accept submissions
    Serve {
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Import a CSV file of contacts
    Import {
        /// Override import.csv_path
        #[arg(long)]
        csv: Option<String>,

        /// Validate and count without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Check that the database answers
    CheckDb,
}

impl CliArgs {
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        match &self.command {
            Command::Serve { port: Some(port) } => config.server.port = *port,
            Command::Import { csv: Some(csv), .. } => config.import.csv_path = csv.clone(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_with_overrides() {
        let args = CliArgs::parse_from([
            "contact-intake",
            "import",
            "--csv",
            "people.csv",
            "--dry-run",
            "-v",
        ]);
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);

        assert!(args.verbose);
        assert!(matches!(args.command, Command::Import { dry_run: true, .. }));
        assert_eq!(config.import.csv_path, "people.csv");
    }

    #[test]
    fn test_parse_serve_port() {
        let args = CliArgs::parse_from([
            "contact-intake",
            "--config",
            "x.toml",
            "serve",
            "--port",
            "8081",
        ]);
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(args.config, "x.toml");
        assert_eq!(config.server.port, 8081);
    }
}
