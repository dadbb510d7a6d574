use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::types::dto::common::ErrorBody;

/// Request model for user login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Slug of the tenant the user belongs to
    pub tenant: String,

    /// Email address for authentication
    pub email: String,

    /// Password for authentication
    pub password: String,
}

/// Response model containing the session token
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT access token for session authentication
    pub access_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,
}

/// Responses of the login endpoint
#[derive(ApiResponse, Debug)]
pub enum LoginApiResponse {
    #[oai(status = 200)]
    Ok(Json<TokenResponse>),

    /// Unknown tenant/user, wrong password, inactive or locked account
    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),

    #[oai(status = 500)]
    Internal(Json<ErrorBody>),
}
