use axum::{Extension, Json};

use crate::errors::{ok, Envelope};
use crate::models::{Profile, User};

/// GET /me
pub async fn me(Extension(user): Extension<User>) -> Json<Envelope<Profile>> {
    ok(Profile::from(&user))
}
