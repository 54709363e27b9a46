pub mod admin;
pub mod debug;
pub mod health;
pub mod jwt;
pub mod message_tokens;
pub mod registration;
pub mod rest_auth;
pub mod users;
