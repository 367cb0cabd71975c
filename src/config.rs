use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;
use chrono::FixedOffset;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub cors_origin: HeaderValue,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Offset used to decide what "today" is for calendar listings
    pub calendar_offset: FixedOffset,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        if jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET must not be empty".to_string());
        }

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origin = env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .parse::<HeaderValue>()
            .map_err(|_| "CORS_ORIGIN is not a valid header value".to_string())?;
        let upload_dir = PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));

        let max_upload_bytes = parse_optional("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;
        let offset_hours: i32 = parse_optional("CALENDAR_UTC_OFFSET_HOURS", 9)?;
        let calendar_offset = calendar_offset(offset_hours)?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            cors_origin,
            upload_dir,
            max_upload_bytes,
            calendar_offset,
        })
    }
}

fn parse_optional<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn calendar_offset(hours: i32) -> Result<FixedOffset, String> {
    // Real-world offsets span -12..=+14
    if !(-12..=14).contains(&hours) {
        return Err(format!("CALENDAR_UTC_OFFSET_HOURS out of range: {}", hours));
    }

    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| format!("Invalid calendar offset: {}", hours))
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            upload_dir,
            max_upload_bytes: 1024 * 1024,
            calendar_offset: FixedOffset::east_opt(9 * 3600).unwrap(),
        }
    }
}
