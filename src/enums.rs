use crate::{Error, Error::*, Result};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use md5::{Digest, Md5};

/// Algorithm type
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum Algorithm {
    MD5,
    MD5_SESS,
}

impl Algorithm {
    /// True for the session variant, where HA1 additionally covers the
    /// server and client nonces
    pub fn sess(self) -> bool {
        self == Algorithm::MD5_SESS
    }

    /// Calculate a hash of bytes, hex-encoded lowercase.
    /// Both recognized algorithms hash with MD5; the -sess flag only
    /// changes how HA1 is composed, not the hash function.
    pub fn hash(self, bytes: &[u8]) -> String {
        hex::encode(Md5::digest(bytes))
    }

    /// Calculate a hash of string's bytes
    pub fn hash_str(self, bytes: &str) -> String {
        self.hash(bytes.as_bytes())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Parse from the format used in the Authorization header
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MD5" => Ok(Algorithm::MD5),
            "MD5-sess" => Ok(Algorithm::MD5_SESS),
            _ => Err(UnsupportedAlgorithm(s.into())),
        }
    }
}

impl Default for Algorithm {
    /// Get a MD5 instance
    fn default() -> Self {
        Algorithm::MD5
    }
}

impl Display for Algorithm {
    /// Format to the form used in HTTP headers
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Algorithm::MD5 => "MD5",
            Algorithm::MD5_SESS => "MD5-sess",
        })
    }
}

/// QOP field values
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum Qop {
    AUTH,
    AUTH_INT,
}

impl FromStr for Qop {
    type Err = Error;

    /// Parse from "auth" or "auth-int" as used in HTTP headers
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auth" => Ok(Qop::AUTH),
            "auth-int" => Ok(Qop::AUTH_INT),
            _ => Err(UnsupportedQop(s.into())),
        }
    }
}

impl Display for Qop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Qop::AUTH => "auth",
            Qop::AUTH_INT => "auth-int",
        })
    }
}
