pub mod attachment;
pub mod email;
pub mod password;
pub mod password_hash;
pub mod user;
pub mod user_id;
