pub mod auth;
pub mod show;
pub mod sync;
