use std::sync::Arc;

use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::services::AuthService;
use crate::types::dto::auth::{LoginApiResponse, LoginRequest};
use crate::AppData;

/// Session authentication API for human users
pub struct AuthApi {
    auth_service: Arc<AuthService>,
}

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

impl AuthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            auth_service: Arc::clone(&app_data.auth_service),
        }
    }
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Exchange tenant slug + email + password for a session token
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, body: Json<LoginRequest>) -> LoginApiResponse {
        match self
            .auth_service
            .login(&body.tenant, &body.email, &body.password)
            .await
        {
            Ok(token) => LoginApiResponse::Ok(Json(token)),
            Err(err) => LoginApiResponse::from_error(err),
        }
    }
}
