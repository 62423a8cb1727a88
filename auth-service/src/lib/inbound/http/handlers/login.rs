use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::AccessToken;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Exchange form-encoded credentials for a bearer token.
pub async fn login<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Form(body): Form<LoginRequestForm>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let user = state
        .auth_service
        .authenticate(&body.username, &body.password)
        .await?;

    let token = state.auth_service.issue_access_token(&user)?;
    tracing::debug!(
        username = %user.username,
        expires_at = %token.expires_at,
        "Access token issued"
    );

    Ok(ApiSuccess::new(StatusCode::OK, (&token).into()))
}

/// OAuth2 password-grant form; fields other than the credentials are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestForm {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponseData {
    pub access_token: String,
    pub token_type: String,
}

impl From<&AccessToken> for TokenResponseData {
    fn from(token: &AccessToken) -> Self {
        Self {
            access_token: token.access_token.clone(),
            token_type: token.token_type.to_string(),
        }
    }
}
