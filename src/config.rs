use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MediMinder";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "mediminder=info,tower_http=warn".to_string()
}

/// Get the application data directory (~/MediMinder/)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MediMinder")
}

/// Runtime configuration, resolved from the environment at startup and
/// injected into the API context. No component reads env vars after this.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (`MEDIMINDER_ADDR`).
    pub bind_addr: SocketAddr,
    /// SQLite database file (`MEDIMINDER_DB`).
    pub db_path: PathBuf,
    /// Ollama base URL (`OLLAMA_URL`).
    pub ollama_url: String,
    /// Vision model for label OCR (`MEDIMINDER_OCR_MODEL`).
    pub ocr_model: String,
    /// Text model for medicine explanations (`MEDIMINDER_EXPLAIN_MODEL`).
    pub explain_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("MEDIMINDER_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

        let db_path = std::env::var("MEDIMINDER_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir().join("mediminder.db"));

        let ollama_url = std::env::var("OLLAMA_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());

        let ocr_model = std::env::var("MEDIMINDER_OCR_MODEL")
            .unwrap_or_else(|_| "medgemma:4b".to_string());

        let explain_model = std::env::var("MEDIMINDER_EXPLAIN_MODEL")
            .unwrap_or_else(|_| "medgemma:4b".to_string());

        Self {
            bind_addr,
            db_path,
            ollama_url,
            ocr_model,
            explain_model,
        }
    }
}
