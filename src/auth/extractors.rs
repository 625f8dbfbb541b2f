use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState, users::repo::User};

/// Validates the bearer token and yields the caller's user ID.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("authentication credentials were not provided".into())
            })?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("invalid auth scheme".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token.trim()).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthorized("invalid or expired token".into())
        })?;

        Ok(AuthUser(claims.sub))
    }
}

/// [`AuthUser`] whose account still exists; a token for a removed user is a 401.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
            warn!(%user_id, "token for missing user");
            ApiError::Unauthorized("user not found".into())
        })?;
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Request};
    use jsonwebtoken::{encode, Header};
    use time::{Duration, OffsetDateTime};

    use super::*;
    use crate::auth::claims::Claims;

    async fn extract(auth: Option<String>) -> Result<Uuid, ApiError> {
        let state = AppState::fake();
        let mut req = Request::builder().uri("/users/me");
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let (mut parts, _) = req.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &state)
            .await
            .map(|AuthUser(id)| id)
    }

    #[tokio::test]
    async fn accepts_signed_bearer_token() {
        let user_id = Uuid::new_v4();
        let token = JwtKeys::from_ref(&AppState::fake()).sign(user_id).unwrap();
        assert_eq!(extract(Some(format!("Bearer {token}"))).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn rejects_missing_header_and_wrong_scheme() {
        assert!(matches!(extract(None).await, Err(ApiError::Unauthorized(_))));
        assert!(matches!(
            extract(Some("Token abc".into())).await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let issued = OffsetDateTime::now_utc() - Duration::hours(2);
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: issued.unix_timestamp() as usize,
            exp: (issued + Duration::hours(1)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

        let err = extract(Some(format!("Bearer {token}"))).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
