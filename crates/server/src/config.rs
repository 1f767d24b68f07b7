use std::env;
use std::path::Path;

use anyhow::Context;
use cubert_fs_engine::ScanPolicy;
use serde::Deserialize;
use tracing::{info, warn};

type Result<T> = anyhow::Result<T>;

const DEFAULT_CONFIG_FILE: &str = "cubert.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 每个请求的默认扫描策略，可被查询参数覆盖。
    #[serde(default)]
    pub scan: ScanPolicy,
}

impl ServerConfig {
    /// 读取 `CUBERT_CONFIG`（默认 `cubert.toml`），文件不存在时使用默认值，
    /// 随后应用 `PORT` 环境变量。
    pub fn load() -> Result<Self> {
        let path = env::var("CUBERT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&path).exists() {
            info!(path = %path, "loading server config");
            Self::from_file(&path)?
        } else {
            info!(path = %path, "config file not found, using defaults");
            Self::default()
        };

        config.apply_port_override(env::var("PORT").ok().as_deref());
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to deserialize server config")
    }

    fn apply_port_override(&mut self, port: Option<&str>) {
        let Some(raw) = port.filter(|raw| !raw.is_empty()) else {
            return;
        };
        match raw.parse::<u16>() {
            Ok(port) => self.port = port,
            Err(err) => warn!(value = raw, error = %err, "ignoring invalid PORT"),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            scan: ScanPolicy::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}
