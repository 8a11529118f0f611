//! Proxy configuration, read from the environment at startup

use std::fmt;
use log::{debug, error};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const API_BASE_VAR: &str = "GEMINI_API_BASE";
pub const TIMEOUT_VAR: &str = "GEMINI_TIMEOUT_SECS";
pub const PORT_VAR: &str = "PORT";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";

pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Everything the proxy needs to know, fixed at deploy time
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig
{   /// Upstream API key
    pub api_key: String
  , /// Model identifier sent upstream
    pub model: String
  , /// API base URL, no trailing slash
    pub api_base: String
  , /// Upstream request timeout in seconds
    pub timeout_secs: u64
  , /// Listen port
    pub port: u16
  , /// Listen address
    pub bind_addr: String
}

impl ProxyConfig
{   /// Config with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self
    {   ProxyConfig
        {   api_key: api_key.into()
          , model: DEFAULT_MODEL.to_string()
          , api_base: DEFAULT_API_BASE.to_string()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
          , port: DEFAULT_PORT
          , bind_addr: DEFAULT_BIND_ADDR.to_string()
        }
    }

    /// Read the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let get = |name: &str| {
          lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_VAR).ok_or_else(|| {
          error!("{} is not set", API_KEY_VAR);
          crate::error::Error::MissingApiKey(
            API_KEY_VAR.to_string()
          )
        })?;

        let mut config = ProxyConfig::new(api_key);

        if let Some(model) = get(MODEL_VAR)
        {   config.model = model;
        }
        if let Some(base) = get(API_BASE_VAR)
        {   config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get(TIMEOUT_VAR)
        {   config.timeout_secs = parse_var(TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = get(PORT_VAR)
        {   config.port = parse_var(PORT_VAR, &raw)?;
        }
        if let Some(addr) = get(BIND_ADDR_VAR)
        {   config.bind_addr = addr;
        }

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// Address the server binds to
    pub fn listen_addr(&self) -> String
    {   format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_var<T>(name: &str, raw: &str)
  -> Result<T, crate::error::Error>
where T: std::str::FromStr
{   raw.parse().map_err(|_| {
      error!("Bad value for {}: {}", name, raw);
      crate::error::Error::InvalidConfiguration(
        format!("{} must be a number, got {:?}", name, raw)
      )
    })
}

// Hand-written so the key never ends up in logs
impl fmt::Debug for ProxyConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("ProxyConfig")
          .field("api_key", &"<redacted>")
          .field("model", &self.model)
          .field("api_base", &self.api_base)
          .field("timeout_secs", &self.timeout_secs)
          .field("port", &self.port)
          .field("bind_addr", &self.bind_addr)
          .finish()
    }
}
