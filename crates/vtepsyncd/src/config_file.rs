//! Configuration file support for vtepsyncd
//!
//! Loads vtepsyncd configuration from a TOML file.
//! Default location: /etc/sonic/vtepsyncd.toml
//!
//! Device credentials have no default: they must come from the file or the
//! command line, otherwise startup fails validation.

use crate::error::{Result, VtepsyncError};
use crate::gateway::EapiConfig;
use crate::running_config::FloodLinePolicy;
use crate::types::{CommunityTag, DEFAULT_COMMUNITY, DEFAULT_VXLAN_INTERFACE};
use crate::vtep_sync::SyncSettings;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/vtepsyncd.toml";

/// Device command API configuration
#[derive(Clone, Deserialize)]
pub struct DeviceConfig {
    /// Command API endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Command API username
    #[serde(default)]
    pub username: Option<String>,

    /// Command API password
    #[serde(default)]
    pub password: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept self-signed device certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Synchronization configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// BGP community marking VTEP loopbacks (16bit:16bit)
    #[serde(default = "default_community")]
    pub community: String,

    /// VXLAN interface holding the flood list
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Seconds between reconciliation cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// How multiple flood-list lines combine
    #[serde(default)]
    pub flood_line_policy: FloodLinePolicy,
}

/// Complete vtepsyncd configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VtepsyncConfig {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

/// Validated settings ready to drive the daemon
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub eapi: EapiConfig,
    pub sync: SyncSettings,
    pub poll_interval: Duration,
}

fn default_url() -> String {
    "https://127.0.0.1/command-api".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_community() -> String {
    DEFAULT_COMMUNITY.to_string()
}

fn default_interface() -> String {
    DEFAULT_VXLAN_INTERFACE.to_string()
}

fn default_poll_interval() -> u64 {
    60
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            timeout_secs: default_timeout(),
            accept_invalid_certs: false,
        }
    }
}

impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            community: default_community(),
            interface: default_interface(),
            poll_interval_secs: default_poll_interval(),
            flood_line_policy: FloodLinePolicy::default(),
        }
    }
}

impl VtepsyncConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                VtepsyncError::Config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(VtepsyncError::Io(e)),
        }
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.sync.poll_interval_secs)
    }

    /// Validate configuration and build the runtime settings
    pub fn validate(&self) -> Result<RuntimeConfig> {
        let community: CommunityTag = self.sync.community.parse()?;

        let username = required(&self.device.username, "username")?;
        let password = required(&self.device.password, "password")?;

        if !self.device.url.starts_with("https://") && !self.device.url.starts_with("http://") {
            return Err(VtepsyncError::validation(
                "url",
                format!("'{}' must be an http(s) URL", self.device.url),
            ));
        }

        let interface = self.sync.interface.trim();
        if interface.is_empty() || interface.contains(['\n', '\r']) {
            return Err(VtepsyncError::validation(
                "interface",
                "must be a single non-empty interface name",
            ));
        }

        if self.sync.poll_interval_secs == 0 {
            return Err(VtepsyncError::validation(
                "poll_interval_secs",
                "must be at least 1 second",
            ));
        }

        if self.device.timeout_secs == 0 {
            return Err(VtepsyncError::validation("timeout_secs", "must be > 0"));
        }

        Ok(RuntimeConfig {
            eapi: EapiConfig {
                url: self.device.url.clone(),
                username,
                password,
                timeout: Duration::from_secs(self.device.timeout_secs),
                accept_invalid_certs: self.device.accept_invalid_certs,
            },
            sync: SyncSettings {
                community,
                interface: interface.to_string(),
                flood_line_policy: self.sync.flood_line_policy,
            },
            poll_interval: self.poll_interval(),
        })
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(VtepsyncError::validation(
            field,
            "is required and has no default",
        )),
    }
}

/// Read a password from a file, dropping the trailing newline
pub fn read_password_file(path: impl AsRef<Path>) -> Result<String> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(content.trim_end_matches(['\n', '\r']).to_string())
}
