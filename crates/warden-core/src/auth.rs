//! Authentication service: sign-in and token verification

use crate::error::{Result, WardenError};
use crate::service::UserService;
use crate::token::{Claims, TokenError, TokenIssuer};
use crate::user::UserProfile;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

/// Token handed back by a successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedToken {
    pub access_token: String,
    /// Always "Bearer"
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until expiry
    #[schema(example = 3600)]
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(users: UserService, issuer: TokenIssuer) -> Self {
        Self { users, issuer }
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Check credentials and sign a token for the matching user
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken> {
        let (_, token) = self.authenticate(email, password).await?;
        Ok(token)
    }

    /// Like [`AuthService::sign_in`], also returning the signed-in user
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserProfile, IssuedToken)> {
        let user = self.users.check_credentials(email, password).await?;

        let access_token = self
            .issuer
            .issue(&user)
            .map_err(|e| WardenError::Internal(e.to_string()))?;

        info!(user_id = %user.id, "Token issued");
        let token = IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.issuer.expires_in(),
        };
        Ok((user, token))
    }

    /// Decode a token, collapsing every failure into [`WardenError::InvalidToken`]
    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.issuer.verify(token).map_err(|e| {
            match e {
                TokenError::Expired => debug!("Token expired"),
                TokenError::InvalidSignature => debug!("Token signature mismatch"),
                ref other => debug!(error = %other, "Token rejected"),
            }
            WardenError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryUserRepository;
    use crate::password::{CredentialHasher, PasswordConfig};
    use crate::token::TokenConfig;
    use crate::user::UserDraft;
    use std::sync::Arc;

    fn auth_with(config: TokenConfig) -> AuthService {
        let users = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            CredentialHasher::new(PasswordConfig::light()),
        );
        AuthService::new(users, TokenIssuer::new(config))
    }

    fn auth() -> AuthService {
        auth_with(TokenConfig::default())
    }

    #[tokio::test]
    async fn test_sign_in_then_verify() {
        let auth = auth();
        let created = auth
            .users()
            .register(UserDraft::new("Ann", "ann@x.com", "secret1"))
            .await
            .unwrap();

        let issued = auth.sign_in("ann@x.com", "secret1").await.unwrap();
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 3600);

        let claims = auth.verify(&issued.access_token).unwrap();
        assert_eq!(claims.sub, created.id);
        assert_eq!(claims.name, "Ann");
        assert_eq!(claims.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_sign_in_with_bad_credentials() {
        let auth = auth();
        auth.users()
            .register(UserDraft::new("Ann", "ann@x.com", "secret1"))
            .await
            .unwrap();

        assert!(matches!(
            auth.sign_in("ann@x.com", "wrong1").await,
            Err(WardenError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in("nobody@x.com", "secret1").await,
            Err(WardenError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_token_from_other_secret_is_invalid() {
        let auth = auth();
        let other = auth_with(TokenConfig {
            secret: "another-secret".to_string(),
            ..Default::default()
        });
        other
            .users()
            .register(UserDraft::new("Ann", "ann@x.com", "secret1"))
            .await
            .unwrap();

        let issued = other.sign_in("ann@x.com", "secret1").await.unwrap();

        assert!(matches!(
            auth.verify(&issued.access_token),
            Err(WardenError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        let auth = auth();
        let created = auth
            .users()
            .register(UserDraft::new("Ann", "ann@x.com", "secret1"))
            .await
            .unwrap();

        let mut claims = auth.issuer().claims_for(&created);
        claims.iat -= 7200;
        claims.exp = claims.iat + 3600;
        let token = auth.issuer().sign(&claims).unwrap();

        assert!(matches!(auth.verify(&token), Err(WardenError::InvalidToken)));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        assert!(matches!(
            auth().verify("definitely not a token"),
            Err(WardenError::InvalidToken)
        ));
    }
}
