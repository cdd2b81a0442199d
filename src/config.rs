use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the recipe service, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Where the authenticated identity is persisted between runs.
    pub session_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = std::env::var("SMARTRECIPES_API_URL")
            .unwrap_or_else(|_| "http://localhost:9999".into())
            .trim_end_matches('/')
            .to_string();
        let request_timeout_secs = std::env::var("SMARTRECIPES_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);
        let session_file = std::env::var("SMARTRECIPES_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        Ok(Self {
            api_base_url,
            request_timeout_secs,
            session_file,
        })
    }
}

fn default_session_file() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".smartrecipes").join("session.json"),
        Err(_) => PathBuf::from(".smartrecipes-session.json"),
    }
}
