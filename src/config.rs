use anyhow::Context;

/// Environment-supplied settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend API, e.g. `https://api.example.com`.
    pub api_base_url: String,
    /// Identity provider tenant domain, e.g. `login.example.com`.
    pub idp_domain: String,
    pub idp_client_id: String,
    /// URL-shaped namespace prefixing the custom role claim.
    pub claim_namespace: String,
    /// Name of the session cookie the identity provider writes.
    pub cookie_name: String,
    /// Machine-to-machine token for the background inbox refresh.
    pub service_token: Option<String>,
    pub inbox_refresh_secs: u64,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = std::env::var("API_BASE_URL").context("API_BASE_URL missing")?;
        let idp_domain = std::env::var("IDP_DOMAIN").context("IDP_DOMAIN missing")?;
        let idp_client_id = std::env::var("IDP_CLIENT_ID").context("IDP_CLIENT_ID missing")?;
        let claim_namespace =
            std::env::var("ROLE_CLAIM_NAMESPACE").context("ROLE_CLAIM_NAMESPACE missing")?;
        let cookie_name =
            std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "appSession".to_string());
        let service_token = std::env::var("SERVICE_TOKEN").ok();
        let inbox_refresh_secs = std::env::var("INBOX_REFRESH_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{port}")
        });

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            idp_domain,
            idp_client_id,
            claim_namespace,
            cookie_name,
            service_token,
            inbox_refresh_secs,
            bind_addr,
        })
    }
}
