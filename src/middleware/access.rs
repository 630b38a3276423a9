use crate::state::SharedState;
use crate::web::session;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Route-level access policy:
///
/// | prefix             | requirement                      |
/// |--------------------|----------------------------------|
/// | `/admin-dashboard` | session + `admin` role           |
/// | `/user-dashboard`  | session                          |
/// | `/apply`           | session                          |
/// | anything else      | none                             |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Public,
    User,
    Apply,
    Admin,
}

impl PathClass {
    pub fn classify(path: &str) -> Self {
        if path.starts_with("/admin-dashboard") {
            PathClass::Admin
        } else if path.starts_with("/user-dashboard") {
            PathClass::User
        } else if path.starts_with("/apply") {
            PathClass::Apply
        } else {
            PathClass::Public
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    RedirectLogin { return_to: String },
    RedirectPending,
}

/// Pure guard decision. Strictly ordered: classification, then
/// authentication, then (admin only) the role check. The session is
/// never resolved for public paths, and roles are never decoded before
/// authentication succeeds — both collaborators are passed lazily so
/// the ordering is enforced by construction.
pub fn evaluate<S, R>(path: &str, resolve_session: S, decode_roles: R) -> Verdict
where
    S: FnOnce() -> Option<String>,
    R: FnOnce(&str) -> Vec<String>,
{
    let class = PathClass::classify(path);
    if class == PathClass::Public {
        return Verdict::Proceed;
    }

    let Some(token) = resolve_session() else {
        return Verdict::RedirectLogin {
            return_to: path.to_string(),
        };
    };

    if class == PathClass::Admin {
        // Decode failure yields an empty role list: fail closed.
        let roles = decode_roles(&token);
        if !roles.iter().any(|r| r == session::ADMIN_ROLE) {
            return Verdict::RedirectPending;
        }
    }

    Verdict::Proceed
}

/// Axum layer applying the policy above, then handing the response to
/// the identity provider's bookkeeping on every branch.
pub async fn access_guard(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let request_headers = req.headers().clone();

    let verdict = evaluate(
        &path,
        || session::extract_token(&request_headers, &state.config.cookie_name),
        |token| session::decode_roles(token, &state.config.claim_namespace),
    );

    let mut response = match verdict {
        Verdict::Proceed => next.run(req).await,
        Verdict::RedirectLogin { return_to } => {
            tracing::debug!("unauthenticated request to {path}, redirecting to login");
            Redirect::to(&login_redirect(&return_to)).into_response()
        }
        Verdict::RedirectPending => {
            tracing::warn!("authenticated request to {path} without admin role");
            Redirect::to("/pending-access").into_response()
        }
    };

    state.idp.finalize(&request_headers, &mut response).await;
    response
}

fn login_redirect(return_to: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("returnTo", return_to)
        .finish();
    format!("/auth/login?{query}")
}
