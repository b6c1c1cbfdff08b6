use async_trait::async_trait;

#[derive(Debug)]
pub enum AuthError {
    MissingCredential,
    InvalidCredential(String),
    ProviderUnavailable(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "Authorization header missing or invalid"),
            AuthError::InvalidCredential(msg) => write!(f, "Token verification failed: {}", msg),
            AuthError::ProviderUnavailable(msg) => {
                write!(f, "Authentication provider unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Resolves a bearer credential to an opaque owner id.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn verify(&self, bearer_token: &str) -> Result<String, AuthError>;
}
