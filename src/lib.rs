//! A typed client for the Spotify Web API.
//!
//! [`SpotifyApi`] sends every request through one pipeline: the credential is
//! refreshed and checked against the endpoint's scopes, the request is sent
//! over a [`Transport`](transport::Transport), and the response is classified
//! and decoded with the path to the first mismatching field on failure.

pub mod api;
pub mod auth;
pub mod config;
pub mod decode;
pub mod endpoints;
pub mod error;
pub mod headers;
pub mod logging;
pub mod model;
pub mod paging;
pub mod query;
pub mod request;
pub mod scope;
pub mod transport;

pub use api::SpotifyApi;
pub use auth::{AuthorizationManager, Credential, CredentialGate, TokenManager};
pub use decode::DecodeFailure;
pub use error::{ErrorBody, SpotifyError};
pub use paging::PageWalker;
pub use query::QueryItems;
pub use request::RequestSpec;
pub use scope::Scope;
