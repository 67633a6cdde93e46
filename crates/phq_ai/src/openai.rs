use phq_core::error::AppError;

/// Connection settings for an OpenAI-compatible API (OpenAI, Groq, local vLLM, ...).
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OpenAiClient {
    /// Remote endpoints must use https; plain http is accepted for loopback servers only.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        let host_and_path = base_url
            .strip_prefix("https://")
            .or_else(|| {
                base_url
                    .strip_prefix("http://")
                    .filter(|rest| is_loopback_authority(rest))
            })
            .ok_or_else(|| {
                AppError::new(
                    "CONFIG_INVALID",
                    "API base URL must be https:// (or http:// on loopback)",
                )
                .with_details(format!("base_url={base_url}"))
            })?;
        if host_and_path.is_empty() || host_and_path.chars().any(char::is_whitespace) {
            return Err(AppError::new("CONFIG_INVALID", "API base URL is malformed")
                .with_details(format!("base_url={base_url}")));
        }

        let api_key = api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        Ok(Self { base_url, api_key })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn is_loopback_authority(rest: &str) -> bool {
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    // Userinfo would let the real host hide after a loopback-looking prefix.
    if authority.contains('@') {
        return false;
    }
    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };
    let port_ok = port.map_or(true, |p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    port_ok && matches!(host, "127.0.0.1" | "localhost")
}

#[cfg(test)]
mod tests {
    use super::OpenAiClient;

    #[test]
    fn accepts_https_and_loopback_http() {
        assert!(OpenAiClient::new("https://api.groq.com/openai/v1", None).is_ok());
        assert!(OpenAiClient::new("http://127.0.0.1:8080/v1/", None).is_ok());
        assert!(OpenAiClient::new("http://localhost:8080", None).is_ok());

        assert!(OpenAiClient::new("http://api.groq.com/openai/v1", None).is_err());
        assert!(OpenAiClient::new("http://127.0.0.1.evil.com/v1", None).is_err());
        assert!(OpenAiClient::new("http://localhost:x@evil.example.com/v1", None).is_err());
        assert!(OpenAiClient::new("http://localhost@evil.example.com", None).is_err());
        assert!(OpenAiClient::new("http://127.0.0.1:80x/v1", None).is_err());
        assert!(OpenAiClient::new("ftp://example.com", None).is_err());
        assert!(OpenAiClient::new("https://", None).is_err());
    }

    #[test]
    fn builds_endpoints_without_double_slashes() {
        let c = OpenAiClient::new("https://api.groq.com/openai/v1/", Some("  ".to_string()))
            .expect("client");
        assert_eq!(c.endpoint("/chat/completions"), "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(c.api_key(), None);
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let c = OpenAiClient::new("https://api.example.com", Some("sk-secret".to_string()))
            .expect("client");
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
    }
}
