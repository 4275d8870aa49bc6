//! Remote platform access
//!
//! JSON POSTs with an optional HS256-signed body, the session cookie and a
//! fixed `application/json` content type. One attempt per call.

mod client;
pub mod jwt;
pub mod payloads;
pub mod query;
pub mod routes;
mod transport;

pub use client::{Lookup, PlatformClient};
pub use jwt::JwtSigner;
pub use query::{AssetListQuery, ContentQuery, Paged};
pub use transport::{HttpTransport, RequestBody, Transport, TransportResponse};
