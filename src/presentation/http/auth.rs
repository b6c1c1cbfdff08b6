use axum::http::{HeaderMap, header::AUTHORIZATION};

use crate::application::ports::auth_provider::{AuthError, AuthProvider};
use crate::presentation::http::errors::HttpError;

/// Resolves the caller's owner id from `Authorization: Bearer <token>`.
pub async fn authenticate(
    auth_provider: &dyn AuthProvider,
    headers: &HeaderMap,
) -> Result<String, HttpError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingCredential)?;
    Ok(auth_provider.verify(token).await?)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
