use portal_core::{AuthResponseBuilder, AuthResponseHelpers, User};

/// Public JSON view of an identity. Never includes the password hash.
pub fn user_body(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id().to_string(),
        "email": user.email().as_str(),
        "is_active": user.is_active(),
        "is_verified": user.is_verified(),
        "is_superuser": user.is_superuser(),
    })
}

pub fn handle_current_user<B: AuthResponseBuilder>(user: &User, builder: B) -> B::Response {
    builder.ok_json(user_body(user))
}

/// Landing response: works with or without a session.
pub fn handle_greeting<B: AuthResponseBuilder>(user: Option<&User>, builder: B) -> B::Response {
    let greeting = user.map_or("anonymous", |u| u.email().as_str());
    builder.ok_json(serde_json::json!({ "user": greeting }))
}
