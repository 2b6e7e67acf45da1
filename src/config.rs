use std::{env, net::IpAddr, net::SocketAddr};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:inventory.db".to_string()),
            host: parse_var("HOST", "127.0.0.1")?,
            port: parse_var("PORT", "3000")?,
            secure_cookies: parse_var("SECURE_COOKIES", "false")?,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, AppError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidConfig { name, value })
}
