use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use crate::domain::user::models::PublicUser;
use crate::inbound::http::middleware::CurrentUser;

/// Return the caller's own public profile.
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiSuccess<PublicUser> {
    ApiSuccess::new(StatusCode::OK, (&user).into())
}
