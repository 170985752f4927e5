// src/config.rs

use std::{env, path::PathBuf, str::FromStr};

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_port: u16,
    pub data_dir: PathBuf,
    pub seed_file: Option<PathBuf>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub shutdown_timeout: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        Self {
            api_port: parse_or("API_PORT", 8080),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            seed_file: env::var("SEED_FILE").ok().map(PathBuf::from),
            jwt_secret,
            // One year, tokens are only a username carrier.
            jwt_expiration: parse_or("JWT_EXPIRATION", 60 * 60 * 24 * 365),
            shutdown_timeout: parse_or("API_TIME_SHUTDOWN", 5),
            rust_log: env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            panic!("{key} has an invalid value: {raw}")
        }),
        Err(_) => default,
    }
}
