use axum::http::HeaderMap;
use base64::{engine::general_purpose, Engine as _};

/// Role string that unlocks the admin dashboard.
pub const ADMIN_ROLE: &str = "admin";

/// Pull the access token from the request: `Authorization: Bearer` first,
/// then the session cookie written by the identity provider.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(val) = auth.to_str() {
            if let Some(bearer) = val.strip_prefix("Bearer ") {
                return Some(bearer.trim().to_string());
            }
        }
    }
    let prefix = format!("{cookie_name}=");
    if let Some(cookie) = headers.get(axum::http::header::COOKIE) {
        if let Ok(val) = cookie.to_str() {
            for pair in val.split(';') {
                let trimmed = pair.trim();
                if let Some(rest) = trimmed.strip_prefix(prefix.as_str()) {
                    return Some(rest.to_string());
                }
            }
        }
    }
    None
}

/// Decode the role list from the access token's custom claim at
/// `<namespace>/roles`.
///
/// Decode-only by design: the identity provider verified the signature
/// when it issued the token, and this shell holds no verification key.
/// Every malformed case collapses to an empty role list, so a broken
/// token can only ever deny access, never grant it.
pub fn decode_roles(token: &str, namespace: &str) -> Vec<String> {
    match decode_payload(token) {
        Some(claims) => {
            let key = format!("{}/roles", namespace.trim_end_matches('/'));
            match claims.get(key.as_str()) {
                Some(serde_json::Value::Array(items)) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
                _ => Vec::new(),
            }
        }
        None => {
            tracing::warn!("access token payload did not decode; treating as no roles");
            Vec::new()
        }
    }
}

fn decode_payload(token: &str) -> Option<serde_json::Value> {
    let mut segments = token.split('.');
    let (_header, payload) = (segments.next()?, segments.next()?);
    if segments.next().is_none() || segments.next().is_some() {
        // A JWT has exactly three segments.
        return None;
    }
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
pub(crate) fn encode_token(claims: &serde_json::Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NS: &str = "https://portal.example.com";

    #[test]
    fn extracts_bearer_before_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer from-header".parse().unwrap(),
        );
        headers.insert(
            axum::http::header::COOKIE,
            "appSession=from-cookie".parse().unwrap(),
        );
        assert_eq!(
            extract_token(&headers, "appSession").as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn extracts_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "theme=dark; appSession=tok123; lang=en".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers, "appSession").as_deref(), Some("tok123"));
        assert_eq!(extract_token(&headers, "other"), None);
    }

    #[test]
    fn decodes_roles_from_namespaced_claim() {
        let token = encode_token(&json!({
            "sub": "auth0|abc",
            format!("{NS}/roles"): ["admin", "member"],
        }));
        assert_eq!(decode_roles(&token, NS), vec!["admin", "member"]);
    }

    #[test]
    fn trailing_slash_on_namespace_is_tolerated() {
        let token = encode_token(&json!({ format!("{NS}/roles"): ["admin"] }));
        assert_eq!(decode_roles(&token, "https://portal.example.com/"), vec!["admin"]);
    }

    #[test]
    fn malformed_tokens_yield_no_roles() {
        assert!(decode_roles("", NS).is_empty());
        assert!(decode_roles("not-a-jwt", NS).is_empty());
        assert!(decode_roles("a.b", NS).is_empty());
        assert!(decode_roles("a.b.c.d", NS).is_empty());
        assert!(decode_roles("head.!!not-base64!!.sig", NS).is_empty());

        let not_json = format!(
            "h.{}.s",
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"plain text")
        );
        assert!(decode_roles(&not_json, NS).is_empty());
    }

    #[test]
    fn missing_or_non_array_claim_yields_no_roles() {
        let missing = encode_token(&json!({ "sub": "auth0|abc" }));
        assert!(decode_roles(&missing, NS).is_empty());

        let wrong_shape = encode_token(&json!({ format!("{NS}/roles"): "admin" }));
        assert!(decode_roles(&wrong_shape, NS).is_empty());

        let mixed = encode_token(&json!({ format!("{NS}/roles"): ["admin", 7] }));
        assert_eq!(decode_roles(&mixed, NS), vec!["admin"]);
    }
}
