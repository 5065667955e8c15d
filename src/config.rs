//! Application configuration
//!
//! Defaults, optionally overlaid by a TOML file, then by the environment
//! variables `HTTP_PORT`, `OSC_HOST`, `OSC_PORT`, `RESET_ON_STOP` and
//! `TRUST_PROXY`.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, NetworkError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub osc: OscConfig,
    pub ui: UiConfig,
    pub transport: TransportConfig,
    pub viewer: ViewerConfig,
}

/// OSC intake socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscConfig {
    pub host: String,
    pub port: u16,
    /// Kernel receive buffer size in bytes
    pub recv_buffer_size: usize,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_OSC_PORT,
            recv_buffer_size: 256 * 1024,
        }
    }
}

/// HTTP server for static assets and the viewer WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub bind_address: String,
    pub http_port: u16,
    pub static_dir: PathBuf,
    /// Take the client address from `X-Forwarded-For`
    pub trust_proxy: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            http_port: DEFAULT_HTTP_PORT,
            static_dir: PathBuf::from("public"),
            trust_proxy: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Rewind the timecode to zero whenever `/stop` is received
    pub reset_on_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Frames buffered per viewer before broadcasts skip it
    pub queue_capacity: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_VIEWER_QUEUE,
        }
    }
}

impl OscConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.host, self.port)
    }
}

impl UiConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.bind_address, self.http_port)
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location if it
    /// exists, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Platform config file location
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "osc-timecode-relay")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from a variable lookup; empty values are treated as unset
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("HTTP_PORT") {
            self.ui.http_port = parse_port("HTTP_PORT", &port)?;
        }
        if let Some(host) = get("OSC_HOST") {
            self.osc.host = host.trim().to_string();
        }
        if let Some(port) = get("OSC_PORT") {
            self.osc.port = parse_port("OSC_PORT", &port)?;
        }
        if let Some(flag) = get("RESET_ON_STOP") {
            self.transport.reset_on_stop = parse_flag(&flag);
        }
        if let Some(flag) = get("TRUST_PROXY") {
            self.ui.trust_proxy = parse_flag(&flag);
        }

        Ok(())
    }

    pub fn osc_addr(&self) -> Result<SocketAddr> {
        self.osc.socket_addr()
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid port: {:?}", key, value)))
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn socket_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = host
        .parse()
        .map_err(|_| NetworkError::InvalidAddress(host.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}
