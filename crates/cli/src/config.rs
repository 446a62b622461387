/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a locally running conversion
/// service. Command-line flags override the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the conversion service (default: `http://localhost:8000`).
    pub server_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `REVOX_SERVER_URL`           | `http://localhost:8000` |
    /// | `REVOX_REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Self {
        let server_url =
            std::env::var("REVOX_SERVER_URL").unwrap_or_else(|_| "http://localhost:8000".into());

        let request_timeout_secs: u64 = std::env::var("REVOX_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REVOX_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            server_url,
            request_timeout_secs,
        }
    }
}
