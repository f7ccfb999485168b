use crate::enums::{Algorithm, Qop};
use crate::store::CredentialStore;
use crate::utils::ct_eq;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Stand-in HA1 hashed for unknown users, so a lookup miss costs the same
/// hash work as a response mismatch
const UNKNOWN_HA1: &str = "00000000000000000000000000000000";

//region Principal

/// Identity authenticated by a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub realm: String,
}

//endregion

//region DigestFields

/// Resolved qop mode of one request
#[derive(Debug)]
enum QopMode<'a> {
    /// No qop directive - RFC 2069 compatibility mode
    Legacy { cnonce: Option<&'a str> },
    /// qop=auth with the client counter and nonce
    Auth { nc: &'a str, cnonce: &'a str },
}

/// Digest fields of one verification attempt, borrowed out of the
/// caller-supplied map.
///
/// All fields are borrowed to reduce runtime overhead; this struct is
/// meaningful only for the one request and is never stored.
#[derive(Debug)]
struct DigestFields<'a> {
    username: &'a str,
    realm: &'a str,
    nonce: &'a str,
    uri: &'a str,
    response: &'a str,
    qop: QopMode<'a>,
    algorithm: Algorithm,
}

fn require<'m>(map: &'m HashMap<String, String>, name: &'static str) -> Result<&'m str> {
    map.get(name)
        .map(String::as_str)
        .ok_or(Error::MissingField(name))
}

impl<'a> DigestFields<'a> {
    /// Validate field presence and decode the enumerated fields.
    ///
    /// # Errors
    /// `MissingField` for an absent required field (`nc`/`cnonce` count as
    /// required once `qop` is given), `UnsupportedQop` for `auth-int` or an
    /// unknown qop token, `UnsupportedAlgorithm` for anything other than
    /// `MD5`/`MD5-sess`.
    fn from_map(map: &'a HashMap<String, String>) -> Result<Self> {
        let username = require(map, "username")?;
        let realm = require(map, "realm")?;
        let nonce = require(map, "nonce")?;
        let uri = require(map, "uri")?;
        let response = require(map, "response")?;

        let qop = match map.get("qop") {
            None => QopMode::Legacy {
                cnonce: map.get("cnonce").map(String::as_str),
            },
            Some(q) => match q.parse::<Qop>()? {
                // auth-int would mean hashing the whole request body
                Qop::AUTH_INT => return Err(Error::UnsupportedQop(q.clone())),
                Qop::AUTH => QopMode::Auth {
                    nc: require(map, "nc")?,
                    cnonce: require(map, "cnonce")?,
                },
            },
        };

        let algorithm = match map.get("algorithm") {
            Some(a) => a.parse()?,
            None => Algorithm::default(),
        };

        Ok(DigestFields {
            username,
            realm,
            nonce,
            uri,
            response,
            qop,
            algorithm,
        })
    }

    /// Client nonce, wherever the request put it. `MD5-sess` needs one
    /// even in legacy mode (RFC 2617 section 3.2.2.2).
    fn cnonce(&self) -> Result<&'a str> {
        match self.qop {
            QopMode::Auth { cnonce, .. } => Ok(cnonce),
            QopMode::Legacy { cnonce } => cnonce.ok_or(Error::MissingField("cnonce")),
        }
    }
}

//endregion

//region HtdigestAuth

/// Digest authentication provider backed by an Apache `.htdigest` file.
///
/// The provider loads the file once at construction and never watches it
/// for changes; restart (rebuild) the provider to pick up edits. It keeps
/// no other state - nonce issuance, nonce-count tracking and replay
/// protection belong to the caller.
///
/// Verification is a pure function over the immutable store, so one
/// provider can serve any number of concurrent calls without locking.
#[derive(Debug, Clone)]
pub struct HtdigestAuth {
    store: CredentialStore,
}

impl HtdigestAuth {
    /// Wrap an already-loaded credential store
    pub fn new(store: CredentialStore) -> Self {
        HtdigestAuth { store }
    }

    /// Load the credential file and build a provider from it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(HtdigestAuth {
            store: CredentialStore::load(path)?,
        })
    }

    /// The underlying credential store
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Verify a Digest authentication attempt.
    ///
    /// `fields` is the already-tokenized content of the `Authorization:
    /// Digest ...` header, keyed by lowercase field name: `username`,
    /// `realm`, `nonce`, `uri` and `response` are required; `qop` (with
    /// `nc` and `cnonce`) and `algorithm` are optional. `method` is the
    /// HTTP method of the request being authenticated.
    ///
    /// On success returns the authenticated [`Principal`]. Every failure
    /// kind must be presented to the remote client as the same generic
    /// authentication failure - in particular [`Error::UnknownCredential`]
    /// versus [`Error::InvalidResponse`], which would otherwise let
    /// usernames be probed.
    pub fn verify(&self, fields: &HashMap<String, String>, method: &str) -> Result<Principal> {
        let f = DigestFields::from_map(fields)?;
        let h = f.algorithm;

        let (stored, known) = match self.store.lookup(f.username, f.realm) {
            Some(ha1) => (ha1, true),
            // unknown users burn the same hash work as a mismatch
            None => (UNKNOWN_HA1, false),
        };

        // HA1: the session variant folds both nonces into the stored hash
        let ha1 = if h.sess() {
            h.hash_str(&format!("{}:{}:{}", stored, f.nonce, f.cnonce()?))
        } else {
            stored.to_owned()
        };

        // HA2: always the method:uri form, auth-int never gets this far
        let ha2 = h.hash_str(&format!("{}:{}", method, f.uri));

        let expected = match &f.qop {
            QopMode::Auth { nc, cnonce } => h.hash_str(&format!(
                "{}:{}:{}:{}:{}:{}",
                ha1,
                f.nonce,
                nc,
                cnonce,
                Qop::AUTH,
                ha2
            )),
            QopMode::Legacy { .. } => {
                h.hash_str(&format!("{}:{}:{}", ha1, f.nonce, ha2))
            }
        };

        let matched = ct_eq(expected.as_bytes(), f.response.as_bytes());

        if !known {
            Err(Error::UnknownCredential)
        } else if matched {
            Ok(Principal {
                username: f.username.to_owned(),
                realm: f.realm.to_owned(),
            })
        } else {
            Err(Error::InvalidResponse)
        }
    }

    /// Authorization hook. The htdigest file is a pure authentication
    /// mechanism, so every permission check reports denied.
    pub fn has_permission(&self, _principal: &Principal, _permission: &str) -> bool {
        false
    }
}

//endregion

//region TESTS

#[cfg(test)]
mod tests {
    use super::{HtdigestAuth, Principal};
    use crate::store::CredentialStore;
    use crate::Error;
    use std::collections::HashMap;

    // htdigest entries for alice/"open sesame" and bob/"correct horse"
    const FIXTURE: &str = "\
alice:example.com:7a6f498f50d864f4c4b7a4ab9d3f878c
bob:example.com:36b6a4d8dc57bf8cb621a34935793fd0
";

    fn provider() -> HtdigestAuth {
        HtdigestAuth::new(CredentialStore::parse(FIXTURE).unwrap())
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Request for alice against /secret, qop=auth, precomputed response
    fn alice_request() -> HashMap<String, String> {
        fields(&[
            ("username", "alice"),
            ("realm", "example.com"),
            ("nonce", "abc123"),
            ("uri", "/secret"),
            ("qop", "auth"),
            ("nc", "00000001"),
            ("cnonce", "xyz"),
            ("response", "619853dd16c029f2ecb8419b197f4c3e"),
        ])
    }

    #[test]
    fn test_verify_qop_auth() {
        let auth = provider();

        let principal = auth.verify(&alice_request(), "GET").unwrap();
        assert_eq!(
            principal,
            Principal {
                username: "alice".to_string(),
                realm: "example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_verify_rfc7616_vector() {
        // the MD5 example from RFC 7616 section 3.9.1
        let store = CredentialStore::parse(
            "Mufasa:http-auth@example.org:3d78807defe7de2157e2b0b6573a855f\n",
        )
        .unwrap();
        let auth = HtdigestAuth::new(store);

        let req = fields(&[
            ("username", "Mufasa"),
            ("realm", "http-auth@example.org"),
            ("nonce", "7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v"),
            ("uri", "/dir/index.html"),
            ("qop", "auth"),
            ("nc", "00000001"),
            ("cnonce", "f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ"),
            ("algorithm", "MD5"),
            ("response", "8ca523f5e9506fed4657c9700eebdbec"),
        ]);

        assert!(auth.verify(&req, "GET").is_ok());
    }

    #[test]
    fn test_verify_rfc2069_legacy() {
        // the example from RFC 2617 section 3.5 (response per errata)
        let store = CredentialStore::parse(
            "Mufasa:testrealm@host.com:4945ecf42b1bb868634058a845bedde8\n",
        )
        .unwrap();
        let auth = HtdigestAuth::new(store);

        let req = fields(&[
            ("username", "Mufasa"),
            ("realm", "testrealm@host.com"),
            ("nonce", "dcd98b7102dd2f0e8b11d0f600bfb0c093"),
            ("uri", "/dir/index.html"),
            ("response", "1949323746fe6a43ef61f9606e7febea"),
        ]);

        let principal = auth.verify(&req, "GET").unwrap();
        assert_eq!(principal.username, "Mufasa");
    }

    #[test]
    fn test_verify_legacy_second_user() {
        let auth = provider();

        let req = fields(&[
            ("username", "bob"),
            ("realm", "example.com"),
            ("nonce", "abc123"),
            ("uri", "/secret"),
            ("response", "eb56e7d8f2d53eb4ed8bd61c3d5b99da"),
        ]);

        assert!(auth.verify(&req, "GET").is_ok());
    }

    #[test]
    fn test_verify_md5_sess() {
        let auth = provider();

        let mut req = alice_request();
        req.insert("algorithm".to_string(), "MD5-sess".to_string());
        // session HA1 = MD5(HA1:nonce:cnonce), same nonces as above
        req.insert(
            "response".to_string(),
            "ec530257821f4607872cf30500dfcdb3".to_string(),
        );

        assert!(auth.verify(&req, "GET").is_ok());
    }

    #[test]
    fn test_md5_sess_needs_cnonce() {
        let auth = provider();

        let req = fields(&[
            ("username", "alice"),
            ("realm", "example.com"),
            ("nonce", "abc123"),
            ("uri", "/secret"),
            ("algorithm", "MD5-sess"),
            ("response", "ec530257821f4607872cf30500dfcdb3"),
        ]);

        assert_eq!(
            auth.verify(&req, "GET").unwrap_err(),
            Error::MissingField("cnonce")
        );
    }

    #[test]
    fn test_tampered_response() {
        let auth = provider();

        let mut req = alice_request();
        // flip the last hex digit
        req.insert(
            "response".to_string(),
            "619853dd16c029f2ecb8419b197f4c3f".to_string(),
        );

        assert_eq!(auth.verify(&req, "GET").unwrap_err(), Error::InvalidResponse);
    }

    #[test]
    fn test_method_is_hashed() {
        let auth = provider();

        // response was computed for GET
        assert_eq!(
            auth.verify(&alice_request(), "POST").unwrap_err(),
            Error::InvalidResponse
        );
    }

    #[test]
    fn test_unknown_user_and_realm() {
        let auth = provider();

        let mut req = alice_request();
        req.insert("username".to_string(), "mallory".to_string());
        assert_eq!(
            auth.verify(&req, "GET").unwrap_err(),
            Error::UnknownCredential
        );

        let mut req = alice_request();
        req.insert("realm".to_string(), "other.example.com".to_string());
        assert_eq!(
            auth.verify(&req, "GET").unwrap_err(),
            Error::UnknownCredential
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let auth = provider();

        for name in &["username", "realm", "nonce", "uri", "response"] {
            let mut req = alice_request();
            req.remove(*name);
            assert_eq!(
                auth.verify(&req, "GET").unwrap_err(),
                Error::MissingField(*name),
                "expected MissingField for {}",
                name
            );
        }
    }

    #[test]
    fn test_qop_requires_nc_and_cnonce() {
        let auth = provider();

        let mut req = alice_request();
        req.remove("nc");
        assert_eq!(auth.verify(&req, "GET").unwrap_err(), Error::MissingField("nc"));

        let mut req = alice_request();
        req.remove("cnonce");
        assert_eq!(
            auth.verify(&req, "GET").unwrap_err(),
            Error::MissingField("cnonce")
        );
    }

    #[test]
    fn test_auth_int_rejected() {
        let auth = provider();

        let mut req = alice_request();
        req.insert("qop".to_string(), "auth-int".to_string());

        // rejected even though everything else checks out for qop=auth
        assert_eq!(
            auth.verify(&req, "GET").unwrap_err(),
            Error::UnsupportedQop("auth-int".to_string())
        );
    }

    #[test]
    fn test_unknown_qop_rejected() {
        let auth = provider();

        let mut req = alice_request();
        req.insert("qop".to_string(), "auth-conf".to_string());

        assert_eq!(
            auth.verify(&req, "GET").unwrap_err(),
            Error::UnsupportedQop("auth-conf".to_string())
        );
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let auth = provider();

        let mut req = alice_request();
        req.insert("algorithm".to_string(), "SHA-256".to_string());

        assert_eq!(
            auth.verify(&req, "GET").unwrap_err(),
            Error::UnsupportedAlgorithm("SHA-256".to_string())
        );
    }

    #[test]
    fn test_has_permission_always_denied() {
        let auth = provider();
        let principal = auth.verify(&alice_request(), "GET").unwrap();

        assert!(!auth.has_permission(&principal, "read"));
        assert!(!auth.has_permission(&principal, "write"));
        assert!(!auth.has_permission(&principal, ""));
    }
}

//endregion
