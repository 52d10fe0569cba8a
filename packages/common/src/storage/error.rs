use std::fmt;

/// Error codes the object store returns when the configured credentials are rejected.
const CREDENTIAL_ERROR_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "InvalidSecurity",
    "SignatureDoesNotMatch",
    FORBIDDEN_CODE,
];

/// Code recorded for a bodiless 403, as returned to HEAD requests.
pub const FORBIDDEN_CODE: &str = "Forbidden";

/// Errors that can occur during blob storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested blob was not found.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The provided key is not a valid relative blob key.
    InvalidKey(String),
    /// The remote object store rejected or failed the request.
    Backend {
        code: Option<String>,
        message: String,
    },
}

impl StorageError {
    /// Whether this is a remote failure caused by bad or missing credentials.
    pub fn is_credential_error(&self) -> bool {
        match self {
            Self::Backend {
                code: Some(code), ..
            } => CREDENTIAL_ERROR_CODES.contains(&code.as_str()),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "blob not found: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidKey(msg) => write!(f, "invalid blob key: {msg}"),
            Self::Backend {
                code: Some(code),
                message,
            } => write!(f, "object store error ({code}): {message}"),
            Self::Backend {
                code: None,
                message,
            } => write!(f, "object store error: {message}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
