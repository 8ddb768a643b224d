use super::jwt::JwtAuth;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Bearer token from `Authorization`, falling back to the `access_token` cookie.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .strip_prefix("access_token=")
                            .map(str::to_string)
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

/// Decodes the caller's token, if any, into request extensions.
///
/// Requests pass through whether or not a token verifies; only a valid token
/// inserts claims. Guarded handlers reject anonymous callers through
/// [`CurrentUser`](super::CurrentUser), so a stale cookie never blocks public
/// routes such as login.
///
/// ```ignore
/// let api = api_routes.layer(axum::middleware::from_fn_with_state(
///     jwt_auth.clone(),
///     jwt_auth_middleware,
/// ));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(request.headers()) {
        match auth.verify_token(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid token"),
        }
    }

    next.run(request).await
}
