pub mod auth;
pub mod instance;
pub mod plant;
