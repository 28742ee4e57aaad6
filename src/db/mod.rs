//! Database module for the auth server
//!
//! This module holds the row models and the credential store. Session
//! persistence lives with the session manager in `crate::auth::session`.

pub mod models;
pub mod users;

pub use models::{Session, User};
pub use users::UserStore;
