//! `catalog-export-auth` — export token verification.
//!
//! Decoupled from HTTP: the API layer extracts the raw token and hands it in.

pub mod token;

pub use token::{StaticTokenVerifier, TokenError, TokenVerifier};
