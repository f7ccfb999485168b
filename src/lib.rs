//! This crate implements server-side verification of Digest Auth credentials
//! as specified by IETF RFCs 2069, 2617, and 7616, checked against a
//! credential file in the Apache `.htdigest` format. It can be used behind
//! any HTTP server that hands it the parsed fields of an
//! `Authorization: Digest ...` header.
//!
//! The provider is a pure authentication mechanism. It proves that the
//! client knows the password belonging to a (username, realm) pair without
//! ever seeing the plaintext password - the file stores only
//! `MD5(username:realm:password)`. Nonce issuance and validation, nonce
//! counters and replay protection are the caller's business; the provider
//! holds no state besides the file loaded at construction. The `auth-int`
//! quality of protection is rejected so request bodies never need to be
//! buffered, and permission checks always report denied.
//!
//! # Examples
//!
//! Basic usage:
//!
//! ```
//! use htdigest_auth::{CredentialStore, HtdigestAuth};
//! use std::collections::HashMap;
//!
//! // One line per credential, as written by `htdigest .htdigest example.com alice`.
//! // Normally this comes from HtdigestAuth::load("/path/to/.htdigest").
//! let store = CredentialStore::parse(
//!     "alice:example.com:7a6f498f50d864f4c4b7a4ab9d3f878c\n",
//! ).unwrap();
//! let auth = HtdigestAuth::new(store);
//!
//! // The HTTP layer tokenizes the Authorization header into a field map
//! let mut fields = HashMap::new();
//! for (k, v) in &[
//!     ("username", "alice"),
//!     ("realm", "example.com"),
//!     ("nonce", "abc123"),
//!     ("uri", "/secret"),
//!     ("qop", "auth"),
//!     ("nc", "00000001"),
//!     ("cnonce", "xyz"),
//!     ("response", "619853dd16c029f2ecb8419b197f4c3e"),
//! ] {
//!     fields.insert(k.to_string(), v.to_string());
//! }
//!
//! let principal = auth.verify(&fields, "GET").unwrap();
//! assert_eq!(principal.username, "alice");
//! assert_eq!(principal.realm, "example.com");
//!
//! // htdigest authenticates, it never authorizes
//! assert!(!auth.has_permission(&principal, "admin"));
//! ```
//!
//! A failed verification reports *why* through [`Error`], but that detail is
//! for server logs only - the HTTP answer to the client should be the same
//! generic 401 for every kind, so that unknown usernames are not
//! distinguishable from wrong passwords.

mod digest;
mod enums;
mod error;
mod store;
mod utils;

pub use error::{Error, Result};

pub use crate::digest::{HtdigestAuth, Principal};
pub use crate::store::CredentialStore;

pub use crate::enums::*;

use std::path::Path;

/// Load a `.htdigest` file and build a provider from it.
/// It's just a convenience method to call [`HtdigestAuth::load()`](struct.HtdigestAuth.html#method.load).
pub fn load<P: AsRef<Path>>(path: P) -> Result<HtdigestAuth> {
    HtdigestAuth::load(path)
}

#[test]
fn test_store_and_verify() {
    use std::collections::HashMap;

    let store = CredentialStore::parse(
        "\
alice:example.com:7a6f498f50d864f4c4b7a4ab9d3f878c
bob:example.com:36b6a4d8dc57bf8cb621a34935793fd0
",
    )
    .unwrap();
    assert_eq!(store.len(), 2);

    let auth = HtdigestAuth::new(store);

    // legacy (RFC 2069) request for bob, no qop
    let mut fields = HashMap::new();
    for (k, v) in &[
        ("username", "bob"),
        ("realm", "example.com"),
        ("nonce", "abc123"),
        ("uri", "/secret"),
        ("response", "eb56e7d8f2d53eb4ed8bd61c3d5b99da"),
    ] {
        fields.insert(k.to_string(), v.to_string());
    }

    let principal = auth.verify(&fields, "GET").unwrap();
    assert_eq!(principal.username, "bob");
    assert!(!auth.has_permission(&principal, "anything"));
}
