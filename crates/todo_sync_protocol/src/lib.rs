//! # Todo Sync Protocol
//!
//! Data types exchanged with the remote todo list service.
//!
//! This crate provides:
//! - [`ItemNetworkModel`], the wire form of an item
//! - Request and response envelopes ([`ElementRequest`], [`ListResponse`], ...)
//! - [`Endpoint`], the method and path of each remote operation
//! - Header names carried by every request
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod endpoint;
mod error;
mod messages;
mod model;

pub use endpoint::{Endpoint, HttpMethod};
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{ElementRequest, ElementResponse, ListRequest, ListResponse, STATUS_OK};
pub use model::ItemNetworkModel;

/// Header carrying the last revision the client has observed.
pub const REVISION_HEADER: &str = "X-Last-Known-Revision";

/// Header carrying the bearer credential.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Formats the value of the [`AUTHORIZATION_HEADER`].
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_value() {
        assert_eq!(bearer("abc"), "Bearer abc");
    }
}
