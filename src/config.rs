use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Path of the JSON document holding users and requests.
    /// Set via GATEPASS_DB_FILE. Default: database.json
    pub db_file: PathBuf,
    /// Browser origin allowed by CORS in addition to localhost.
    /// Set via GATEPASS_FRONTEND_ORIGIN.
    pub frontend_origin: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let port = match std::env::var("GATEPASS_PORT") {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("GATEPASS_PORT is not a valid port: {}", raw))?,
        Err(_) => 3000,
    };

    let log_format = match std::env::var("GATEPASS_LOG_FORMAT")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "json" => LogFormat::Json,
        _ => LogFormat::Pretty,
    };

    Ok(Config {
        port,
        db_file: std::env::var("GATEPASS_DB_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("database.json")),
        frontend_origin: std::env::var("GATEPASS_FRONTEND_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5500".into()),
        log_format,
    })
}
