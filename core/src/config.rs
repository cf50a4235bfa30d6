//! Immutable run configuration shared by every scenario step.

const HTTPS_PREFIX: &str = "https://";
const HTTP_PREFIX: &str = "http://";

/// Connection target, credentials and run mode for the scenario runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: Option<String>,
    verify: bool,
    verbose: bool,
}

impl ClientConfig {
    /// `host` may carry an `https://` or `http://` prefix; a bare host name
    /// is reached over plain HTTP.
    pub fn new(host: &str, api_key: Option<String>, verify: bool, verbose: bool) -> Self {
        let host = host.trim().trim_end_matches('/');
        let base_url = if host.starts_with(HTTPS_PREFIX) {
            host.to_string()
        } else {
            let rest = host.strip_prefix(HTTP_PREFIX).unwrap_or(host);
            format!("{HTTP_PREFIX}{rest}")
        };
        Self {
            base_url,
            // An empty key behaves like no key at all.
            api_key: api_key.filter(|key| !key.is_empty()),
            verify,
            verbose,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn verify(&self) -> bool {
        self.verify
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
