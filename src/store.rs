use crate::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};

/// Length of a hex-encoded MD5 digest
const HA1_HEX_LEN: usize = 32;

/// Immutable credential index parsed from an Apache `.htdigest` file.
///
/// Each line of the file has the form `username:realm:HA1`, where HA1 is the
/// lowercase hex MD5 of `username:realm:password` as produced by the apache
/// `htdigest` tool. Only the HA1 is kept in memory; the plaintext password is
/// never seen by this crate.
///
/// The store is read-only after construction and safe to share between any
/// number of concurrent verification calls.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialStore {
    /// Keyed `username:realm` - unambiguous because neither field may
    /// contain a colon in this format
    entries: HashMap<String, String>,
}

impl CredentialStore {
    /// Read and parse a `.htdigest` file.
    ///
    /// # Errors
    /// [`Error::CredentialFileUnavailable`](crate::Error::CredentialFileUnavailable)
    /// if the file cannot be read, otherwise whatever [`parse`](Self::parse)
    /// reports.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let store = Self::parse(&text)?;
        info!(
            "loaded {} credential(s) from {}",
            store.len(),
            path.as_ref().display()
        );
        Ok(store)
    }

    /// Parse credential lines from an in-memory string.
    ///
    /// Blank lines are skipped. Any other deviation from the
    /// `username:realm:HA1` form fails the whole load - a malformed
    /// credential file is a configuration error, not a runtime condition.
    /// A repeated (username, realm) pair keeps the later line, matching
    /// htdigest tool behavior.
    pub fn parse(input: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for (n, raw) in input.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() != 3 {
                return Err(Error::MalformedCredentialFile(
                    n + 1,
                    format!("expected 3 colon-separated fields, found {}", fields.len()),
                ));
            }

            let (username, realm, ha1) = (fields[0], fields[1], fields[2]);

            if username.is_empty() {
                return Err(Error::MalformedCredentialFile(n + 1, "empty username".into()));
            }
            if realm.is_empty() {
                return Err(Error::MalformedCredentialFile(n + 1, "empty realm".into()));
            }
            if ha1.len() != HA1_HEX_LEN || !ha1.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(Error::MalformedCredentialFile(
                    n + 1,
                    format!("HA1 is not a {}-digit hex string", HA1_HEX_LEN),
                ));
            }

            let key = format!("{}:{}", username, realm);
            if entries.insert(key, ha1.to_ascii_lowercase()).is_some() {
                debug!(
                    "duplicate entry for \"{}\" in realm \"{}\", keeping the later line",
                    username, realm
                );
            }
        }

        Ok(CredentialStore { entries })
    }

    /// Look up the stored HA1 for a (username, realm) pair.
    ///
    /// Case-sensitive exact match on both fields. `None` is the "unknown
    /// user" outcome; callers must treat it exactly like a wrong password
    /// so usernames cannot be probed.
    pub fn lookup(&self, username: &str, realm: &str) -> Option<&str> {
        self.entries
            .get(&format!("{}:{}", username, realm))
            .map(String::as_str)
    }

    /// Number of loaded credentials
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
