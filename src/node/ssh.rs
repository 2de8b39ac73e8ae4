//! Executor that runs scripts over the system `ssh` client

use anyhow::{anyhow, Result};
use shell_escape::escape;
use std::borrow::Cow;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use super::shell::run_with_timeout;
use super::{ExecOutput, RemoteExecutor, DEFAULT_COMMAND_TIMEOUT};

/// Connection settings shared by every node in a pool
#[derive(Debug, Clone)]
pub struct SshSettings {
    pub user: String,
    pub port: u16,
    pub identity_file: Option<PathBuf>,
    /// Wrap each script in `sudo -n`
    pub use_sudo: bool,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            port: 22,
            identity_file: None,
            use_sudo: false,
            connect_timeout: Duration::from_secs(10),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

/// Runs scripts on one host with `ssh user@host sh -c '<script>'`.
///
/// BatchMode is always on: a host that would prompt for a password or a
/// host-key confirmation fails instead of hanging the phase.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    program: PathBuf,
    host: String,
    settings: SshSettings,
}

impl SshExecutor {
    /// Create an executor for `host`, failing if no `ssh` client is installed
    pub fn new(host: impl Into<String>, settings: SshSettings) -> Result<Self> {
        let program = which::which("ssh").map_err(|_| {
            anyhow!(
                "ssh is not installed. Please install an OpenSSH client.\n\
                 On Ubuntu/Debian: sudo apt-get install openssh-client"
            )
        })?;

        Ok(Self::with_program(program, host, settings))
    }

    /// Create an executor using an explicit client binary
    pub fn with_program(
        program: impl Into<PathBuf>,
        host: impl Into<String>,
        settings: SshSettings,
    ) -> Self {
        Self {
            program: program.into(),
            host: host.into(),
            settings,
        }
    }

    /// Host as ssh expects it, with IPv6 brackets removed
    pub fn host(&self) -> &str {
        self.host
            .strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
            .unwrap_or(&self.host)
    }

    /// Arguments passed to the ssh client for `script`
    pub fn command_args(&self, script: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.settings.connect_timeout.as_secs()),
            "-p".to_string(),
            self.settings.port.to_string(),
        ];

        if let Some(identity) = &self.settings.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }

        args.push(format!("{}@{}", self.settings.user, self.host()));
        args.push(self.remote_command(script));
        args
    }

    fn remote_command(&self, script: &str) -> String {
        let escaped = escape(Cow::Borrowed(script));
        if self.settings.use_sudo {
            format!("sudo -n sh -c {escaped}")
        } else {
            format!("sh -c {escaped}")
        }
    }
}

impl RemoteExecutor for SshExecutor {
    fn execute(&self, script: &str) -> Result<ExecOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_args(script));
        run_with_timeout(
            cmd,
            &format!("ssh to {}", self.host()),
            self.settings.command_timeout,
        )
    }
}
