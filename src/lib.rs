// Komainu - Azure AD JWT validation library

pub mod certs;
pub mod config;
pub mod discovery;
pub mod error;
pub mod jwks;
pub mod token;
pub mod validator;
pub mod verify;
