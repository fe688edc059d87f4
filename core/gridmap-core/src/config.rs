//! Dialect configuration — an explicit key-value property bag.
//!
//! Configuration is built by the caller and handed to a dialect at
//! construction time. Nothing here reads the process environment.

use crate::error::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Well-known property keys.
pub mod properties {
    /// Which datastore to use: `memory` or `sled`
    pub const DATASTORE_PROVIDER: &str = "gridmap.datastore_provider";
    /// Comma-separated host list, each entry optionally with a port
    pub const HOST: &str = "gridmap.host";
    /// Default port for host entries without one
    pub const PORT: &str = "gridmap.port";
    pub const USERNAME: &str = "gridmap.username";
    pub const PASSWORD: &str = "gridmap.password";
    pub const DATABASE: &str = "gridmap.database";
    /// Directory of the sled database
    pub const SLED_PATH: &str = "gridmap.sled.path";
    /// Open a throw-away sled database, removed on drop
    pub const SLED_TEMPORARY: &str = "gridmap.sled.temporary";
    /// sled page cache size in bytes
    pub const SLED_CACHE_CAPACITY: &str = "gridmap.sled.cache_capacity";
}

/// One entry of a host list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostAddress {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl HostAddress {
    /// Parse `host`, `host:port`, `[ipv6]`, `[ipv6]:port` or a bare IPv6 address.
    pub fn parse(entry: &str, default_port: u16) -> GridResult<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(GridError::Config("empty host entry".to_string()));
        }

        if let Some(rest) = entry.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| GridError::Config(format!("unterminated IPv6 host '{entry}'")))?;
            let port = match tail {
                "" => default_port,
                _ => {
                    let port = tail.strip_prefix(':').ok_or_else(|| {
                        GridError::Config(format!("unexpected text after IPv6 host '{entry}'"))
                    })?;
                    parse_port(port, entry)?
                }
            };
            return Ok(Self {
                host: host.to_string(),
                port,
            });
        }

        match entry.matches(':').count() {
            0 => Ok(Self {
                host: entry.to_string(),
                port: default_port,
            }),
            1 => {
                let (host, port) = entry.split_once(':').unwrap_or((entry, ""));
                if host.is_empty() {
                    return Err(GridError::Config(format!("missing host in '{entry}'")));
                }
                Ok(Self {
                    host: host.to_string(),
                    port: parse_port(port, entry)?,
                })
            }
            // bare IPv6 literal, no port possible
            _ => Ok(Self {
                host: entry.to_string(),
                port: default_port,
            }),
        }
    }

    /// Parse a comma-separated host list.
    pub fn parse_list(list: &str, default_port: u16) -> GridResult<Vec<Self>> {
        list.split(',')
            .map(|entry| Self::parse(entry, default_port))
            .collect()
    }
}

fn parse_port(port: &str, entry: &str) -> GridResult<u16> {
    port.trim()
        .parse::<u16>()
        .map_err(|e| GridError::Config(format!("invalid port in '{entry}': {e}")))
}

/// String properties passed to a dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectConfig {
    properties: HashMap<String, String>,
}

impl DialectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Build from a flat JSON object. Numbers and booleans are kept as text.
    pub fn from_json(json: &str) -> GridResult<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut properties = HashMap::with_capacity(object.len());
        for (key, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(GridError::Config(format!(
                        "property '{key}' must be a string, number or boolean, got {other}"
                    )));
                }
            };
            properties.insert(key, text);
        }
        Ok(Self { properties })
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn require(&self, key: &str) -> GridResult<&str> {
        self.get(key)
            .ok_or_else(|| GridError::Config(format!("missing required property '{key}'")))
    }

    pub fn get_bool(&self, key: &str) -> GridResult<Option<bool>> {
        self.get(key)
            .map(|v| match v.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(GridError::Config(format!(
                    "property '{key}' must be true or false, got '{other}'"
                ))),
            })
            .transpose()
    }

    pub fn get_u64(&self, key: &str) -> GridResult<Option<u64>> {
        self.get(key)
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map_err(|e| GridError::Config(format!("property '{key}': {e}")))
            })
            .transpose()
    }

    /// Hosts from [`properties::HOST`], using [`properties::PORT`] (or
    /// `default_port`) for entries without a port. Empty when no host is set.
    pub fn hosts(&self, default_port: u16) -> GridResult<Vec<HostAddress>> {
        let port = match self.get(properties::PORT) {
            Some(p) => parse_port(p, properties::PORT)?,
            None => default_port,
        };
        match self.get(properties::HOST) {
            Some(list) => HostAddress::parse_list(list, port),
            None => Ok(Vec::new()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
