use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    net::{SocketAddr, ToSocketAddrs},
    time::Duration,
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub dataset_url: String,
    pub app_token: Option<String>,
    pub api_key: Option<String>,
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub facet_limit: i64,
    pub request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    secoql_listen_addr: Option<String>,
    #[serde(default)]
    secoql_listen_host: Option<String>,
    #[serde(default)]
    secoql_listen_port: Option<u16>,
    #[serde(default = "default_dataset_url")]
    secoql_dataset_url: String,
    #[serde(default)]
    secoql_app_token: Option<String>,
    #[serde(default)]
    secoql_api_key: Option<String>,
    #[serde(default = "default_page_size")]
    secoql_default_page_size: i64,
    #[serde(default = "default_max_page_size")]
    secoql_max_page_size: i64,
    #[serde(default = "default_facet_limit")]
    secoql_facet_limit: i64,
    #[serde(default = "default_timeout_secs")]
    secoql_request_timeout_secs: u64,
}

fn default_dataset_url() -> String {
    "https://www.datos.gov.co/resource/jbjy-vk9h.json".to_string()
}

const fn default_page_size() -> i64 {
    50
}

const fn default_max_page_size() -> i64 {
    1000
}

const fn default_facet_limit() -> i64 {
    50_000
}

const fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let raw: RawConfig =
            envy::from_env().context("failed to parse SECOQL_* environment variables")?;

        let listen_addr = resolve_addr(
            raw.secoql_listen_addr,
            raw.secoql_listen_host,
            raw.secoql_listen_port,
        )?;

        let app_token = raw
            .secoql_app_token
            .filter(|token| !token.trim().is_empty());

        Ok(Self {
            listen_addr,
            dataset_url: raw.secoql_dataset_url,
            app_token,
            api_key: raw.secoql_api_key,
            default_page_size: raw.secoql_default_page_size.max(1),
            max_page_size: raw.secoql_max_page_size.max(raw.secoql_default_page_size),
            facet_limit: raw.secoql_facet_limit.max(1),
            request_timeout: Duration::from_secs(raw.secoql_request_timeout_secs.max(1)),
        })
    }
}

fn resolve_addr(
    addr: Option<String>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<SocketAddr> {
    if let Some(addr) = addr {
        return addr
            .to_socket_addrs()
            .context("invalid SECOQL_LISTEN_ADDR value")?
            .next()
            .context("SECOQL_LISTEN_ADDR resolved to no addresses");
    }

    let host = host.unwrap_or_else(|| "0.0.0.0".to_string());
    let port = port.unwrap_or(8490);
    let combined = format!("{}:{}", host, port);
    combined
        .to_socket_addrs()
        .context("invalid SECOQL listen host/port combination")?
        .next()
        .context("listen address resolved to no targets")
}
