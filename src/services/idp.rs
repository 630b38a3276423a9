use crate::config::Config;
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::response::Response;
use url::Url;

/// External identity provider collaborator. Token issuance, verification
/// and refresh all live on the provider's side; this shell only builds
/// redirect URLs and lets the provider do its per-request bookkeeping.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Login entry point, carrying the originally requested path so the
    /// provider can send the user back after authentication.
    fn authorize_url(&self, return_to: &str) -> String;

    fn logout_url(&self) -> String;

    /// Per-request session bookkeeping (sliding cookie expiry, token
    /// refresh). Invoked by the access guard on every branch.
    async fn finalize(&self, request_headers: &HeaderMap, response: &mut Response);
}

/// OIDC-style provider addressed purely through redirects.
pub struct OidcProvider {
    domain: String,
    client_id: String,
    cookie_name: String,
}

impl OidcProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            domain: config.idp_domain.clone(),
            client_id: config.idp_client_id.clone(),
            cookie_name: config.cookie_name.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    fn authorize_url(&self, return_to: &str) -> String {
        let mut url = Url::parse(&format!("https://{}/authorize", self.domain))
            .unwrap_or_else(|_| Url::parse("https://localhost/authorize").unwrap());
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("returnTo", return_to);
        url.to_string()
    }

    fn logout_url(&self) -> String {
        let mut url = Url::parse(&format!("https://{}/v2/logout", self.domain))
            .unwrap_or_else(|_| Url::parse("https://localhost/v2/logout").unwrap());
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id);
        url.to_string()
    }

    async fn finalize(&self, request_headers: &HeaderMap, response: &mut Response) {
        // Sliding expiry: rewrite the session cookie the provider issued
        // so an active user is not logged out mid-visit.
        let token = crate::web::session::extract_token(request_headers, &self.cookie_name);
        if let Some(token) = token {
            let cookie = format!(
                "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age=86400",
                self.cookie_name, token
            );
            if let Ok(value) = cookie.parse() {
                response
                    .headers_mut()
                    .append(axum::http::header::SET_COOKIE, value);
            }
        }
    }
}
