//! Remote command execution over SSH.
//!
//! Builds an `ssh user@host -p port "cd webroot; <command>"` invocation
//! around [`crate::core::command::execute`]. The inner command is
//! escaped for the double-quoted payload so quoting survives the hop.

use crate::command::{self, ExecOptions};
use crate::error::{Error, Result};
use crate::utils::shell;
use serde::{Deserialize, Serialize};
use std::io::Write;

fn default_port() -> u16 {
    22
}

fn default_webroot() -> String {
    "./".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_webroot")]
    pub webroot: String,
    #[serde(default)]
    pub identity_file: Option<String>,
}

impl RemoteConfig {
    pub fn new(user: &str, host: &str) -> Self {
        Self {
            user: user.to_string(),
            host: host.to_string(),
            port: default_port(),
            webroot: default_webroot(),
            identity_file: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user.is_empty() {
            return Err(Error::MissingParameter("user".to_string()));
        }
        if self.host.is_empty() {
            return Err(Error::MissingParameter("host".to_string()));
        }
        Ok(())
    }

    /// Hosts that refer to the local machine skip ssh entirely.
    pub fn is_local(&self) -> bool {
        matches!(self.host.as_str(), "localhost" | "127.0.0.1" | "::1")
    }

    /// Build the full shell invocation for `command` on this host.
    pub fn wrap_command(&self, command: &str) -> Result<String> {
        self.validate()?;

        if self.is_local() {
            return Ok(format!(
                "cd {}; {}",
                shell::quote_path(&self.webroot),
                command
            ));
        }

        let identity = match &self.identity_file {
            Some(path) if !path.is_empty() => {
                let expanded = shellexpand::tilde(path).to_string();
                format!(" -i {}", shell::quote_path(&expanded))
            }
            _ => String::new(),
        };

        Ok(format!(
            "ssh{} {}@{} -p {} \"cd {}; {}\"",
            identity,
            self.user,
            self.host,
            self.port,
            shell::escape_double_quoted(&self.webroot),
            shell::escape_double_quoted(command)
        ))
    }
}

/// Execute `command` on the configured host and return trimmed stdout.
/// Fails with [`Error::MissingParameter`] before anything is spawned
/// when `user` or `host` is absent.
pub fn execute_remote<W: Write>(
    command: &str,
    config: &RemoteConfig,
    options: ExecOptions<'_, W>,
) -> Result<String> {
    let wrapped = config.wrap_command(command)?;
    if config.is_local() {
        log_status!("remote", "Host '{}' is localhost — running locally", config.host);
    }
    command::execute(&wrapped, options)
}
