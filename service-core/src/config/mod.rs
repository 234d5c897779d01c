use crate::error::AppError;
use config::Config as Cfg;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// HTTP listener settings shared by the service binaries.
///
/// Read from `APP__HOST` / `APP__PORT` only; service-specific settings live
/// with the service, not here.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

impl HttpConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_bind_all_interfaces() {
        let config = HttpConfig::default();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_socket_addr_combines_host_and_port() {
        let config = HttpConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 9090,
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9090");
    }
}
