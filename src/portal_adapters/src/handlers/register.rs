use portal_application::UserManager;
use portal_core::{
    AuthResponseBuilder, Email, Password, PasswordHasher, PortalError, UserCreate, UserStore,
};
use secrecy::Secret;
use serde::Deserialize;

use super::users::user_body;

#[derive(Debug, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: Secret<String>,
}

/// Register a local identity and answer `201` with its public view.
#[tracing::instrument(name = "handle_register", skip_all)]
pub async fn handle_register<U, H, B>(
    users: &UserManager<U, H>,
    registration: Registration,
    builder: B,
) -> Result<B::Response, PortalError>
where
    U: UserStore,
    H: PasswordHasher,
    B: AuthResponseBuilder,
{
    let email = Email::parse(&registration.email)?;
    let password = Password::try_from(registration.password)?;

    let user = users.register(UserCreate::new(email, password)).await?;
    tracing::info!(user_id = %user.id(), "Registered user");

    Ok(builder.status(201).json_body(user_body(&user)).build())
}
