use axum::response::Response;
use portal_adapters::handlers;

use crate::{
    adapters::response_builder,
    extractors::{CurrentUser, OptionalUser},
};

pub async fn me(CurrentUser(user): CurrentUser) -> Response {
    handlers::handle_current_user(&user, response_builder())
}

pub async fn index(OptionalUser(user): OptionalUser) -> Response {
    handlers::handle_greeting(user.as_ref(), response_builder())
}
