use std::fmt::{self, Display, Formatter};
use std::result;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// Credential file missing or unreadable at load time
    CredentialFileUnavailable(String),
    /// Structural violation in the credential file (1-based line number, reason)
    MalformedCredentialFile(usize, String),
    /// A required Digest field was absent from the request
    MissingField(&'static str),
    /// "auth-int" or an unrecognized qop token was requested
    UnsupportedQop(String),
    /// Unrecognized algorithm value
    UnsupportedAlgorithm(String),
    /// No entry for the (username, realm) pair
    UnknownCredential,
    /// The supplied response hash does not match the expected one
    InvalidResponse,
}

pub type Result<T> = result::Result<T, Error>;

use Error::*;

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CredentialFileUnavailable(ctx) => write!(f, "Credential file unavailable: {}", ctx),
            MalformedCredentialFile(line, ctx) => {
                write!(f, "Malformed credential file, line {}: {}", line, ctx)
            }
            MissingField(name) => write!(f, "Missing \"{}\" field", name),
            UnsupportedQop(ctx) => write!(f, "Unsupported qop: {}", ctx),
            UnsupportedAlgorithm(ctx) => write!(f, "Unsupported algorithm: {}", ctx),
            UnknownCredential => write!(f, "Unknown credential"),
            InvalidResponse => write!(f, "Invalid response hash"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        CredentialFileUnavailable(e.to_string())
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for the kinds raised while verifying a request, as opposed to
    /// the fatal load-time kinds. The caller collapses all of these into
    /// the same "authentication failed" answer towards the client; the
    /// specific kind is for server-side diagnostics only.
    pub fn is_auth_failure(&self) -> bool {
        !matches!(
            self,
            CredentialFileUnavailable(_) | MalformedCredentialFile(_, _)
        )
    }
}
