//! # Authentication Module
//!
//! OAuth 2.0 client-credentials authentication against the DeviantArt API.
//!
//! ## Overview
//!
//! The tool authenticates as an application, never as a user. A credentials
//! file supplies the client id and secret, [`ClientCredentialsFlow`] performs
//! the token handshake, and [`ClientCredentialsSession`] hands out a valid
//! bearer token to every request, re-authenticating shortly before expiry.

pub mod credentials;
pub mod error;
pub mod oauth;
pub mod session;
pub mod types;

pub use credentials::ClientCredentials;
pub use error::{AuthError, Result};
pub use oauth::{ClientCredentialsFlow, OAuthConfig};
pub use session::{ClientCredentialsSession, StaticToken, TokenSource};
pub use types::OAuthTokens;
