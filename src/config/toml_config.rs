use crate::utils::error::{IntakeError, Result};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use url::Url;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

/// Either a full `url`, or the `host`/`user`/`password`/`name` parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: 3306,
            user: None,
            password: None,
            name: None,
            max_connections: 10,
            acquire_timeout_secs: 30,
            table: "mysql_table".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub csv_path: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_path: "personal_information.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    /// Reads `path` when it exists, otherwise starts from defaults. Missing
    /// database settings are then filled from the environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::from_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.database.apply_env_fallback();
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IntakeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| IntakeError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.database.clear_unresolved();
        Ok(config)
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl DatabaseConfig {
    /// A value still holding `${VAR}` after substitution counts as not set,
    /// so the `DB_*` fallback and the missing-field checks see it.
    fn clear_unresolved(&mut self) {
        let slots = [
            ("database.url", &mut self.url),
            ("database.host", &mut self.host),
            ("database.user", &mut self.user),
            ("database.password", &mut self.password),
            ("database.name", &mut self.name),
        ];
        for (field, slot) in slots {
            if slot.as_deref().is_some_and(|v| ENV_VAR.is_match(v)) {
                tracing::warn!("{} references an unset environment variable, ignoring it", field);
                *slot = None;
            }
        }
    }

    pub fn apply_env_fallback(&mut self) {
        self.apply_fallback_with(|key| std::env::var(key).ok());
    }

    fn apply_fallback_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, key: &str| {
            if slot.is_none() {
                *slot = lookup(key).filter(|v| !v.is_empty());
            }
        };
        fill(&mut self.url, "DATABASE_URL");
        fill(&mut self.host, "DB_HOST");
        fill(&mut self.user, "DB_USER");
        fill(&mut self.password, "DB_PASS");
        fill(&mut self.name, "DB_NAME");
    }

    pub fn connection_url(&self) -> Result<Url> {
        if let Some(url) = &self.url {
            validation::validate_database_url("database.url", url)?;
            return Url::parse(url).map_err(|e| IntakeError::ConfigError {
                message: format!("database.url: {}", e),
            });
        }

        let host = validation::validate_required_field("database.host", &self.host)?;
        let name = validation::validate_required_field("database.name", &self.name)?;
        validation::validate_non_empty_string("database.host", host)?;
        validation::validate_non_empty_string("database.name", name)?;

        let mut url = Url::parse(&format!("mysql://{}:{}", host, self.port)).map_err(|e| {
            IntakeError::InvalidConfigValueError {
                field: "database.host".to_string(),
                value: host.clone(),
                reason: e.to_string(),
            }
        })?;
        url.set_path(&format!("/{}", name.trim_start_matches('/')));

        let invalid = || IntakeError::ConfigError {
            message: "database credentials cannot be placed in a connection URL".to_string(),
        };
        if let Some(user) = &self.user {
            url.set_username(user).map_err(|_| invalid())?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password)).map_err(|_| invalid())?;
        }
        Ok(url)
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| IntakeError::InvalidConfigValueError {
                field: "server.host".to_string(),
                value: self.host.clone(),
                reason: "Must be an IP address".to_string(),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.database.connection_url()?;
        validation::validate_identifier("database.table", &self.database.table)?;
        validation::validate_positive_number(
            "database.max_connections",
            self.database.max_connections,
            1,
        )?;
        self.server.socket_addr()?;
        validation::validate_path("import.csv_path", &self.import.csv_path)?;
        Ok(())
    }
}
