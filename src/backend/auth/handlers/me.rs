/**
 * Get Current User Handler
 *
 * GET /api/auth/me returns the account behind the caller's token. The
 * `AuthUser` extractor has already verified the token and reloaded the user.
 */

use axum::response::Json;

use crate::backend::middleware::auth::AuthUser;
use crate::shared::User;

pub async fn get_me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
