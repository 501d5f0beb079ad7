use std::{env, path::PathBuf};

/// Default external file host, a Catbox-style single-field multipart API.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://catbox.moe/user/api.php";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,

    /// PostgreSQL connection string; when absent the server runs on the
    /// in-memory backend.
    pub database_url: Option<String>,

    /// External file-hosting endpoint the upload proxy forwards to.
    pub upload_endpoint: String,

    /// Directory holding the SPA build; extensionless non-API paths fall
    /// back to its entry document.
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            database_url: env::var("DATABASE_URL").ok(),

            upload_endpoint: env::var("UPLOAD_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_ENDPOINT.to_string()),

            static_dir: env::var("STATIC_DIR").ok().map(PathBuf::from),
        })
    }
}
