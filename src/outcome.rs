/// Result of a single call.
///
/// Exactly one variant is produced per call and it is never mutated
/// afterwards. [`Outcome::Loading`] is only emitted by the consumption helpers
/// in [`crate::subscriber`] as a transient marker.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    /// The call is in flight.
    Loading,
    /// 2xx response; `body` is `None` when the response body was empty.
    Success { status_code: u16, body: Option<T> },
    /// Non-2xx response or local/transport failure.
    Error {
        status_code: Option<u16>,
        message: String,
    },
    /// The host could not be reached.
    NoConnectivity { message: String },
    /// The server rejected the session (401, and 5xx under the default policy).
    SessionExpired { status_code: u16, message: String },
}

impl<T> Outcome<T> {
    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self::Error {
            status_code: None,
            message: message.into(),
        }
    }

    pub(crate) fn http_error(status_code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether this is a terminal variant, i.e. anything but `Loading`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// HTTP status carried by the variant, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. } | Self::SessionExpired { status_code, .. } => {
                Some(*status_code)
            }
            Self::Error { status_code, .. } => *status_code,
            Self::Loading | Self::NoConnectivity { .. } => None,
        }
    }

    /// Failure text for every non-success terminal variant.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. }
            | Self::NoConnectivity { message }
            | Self::SessionExpired { message, .. } => Some(message),
            Self::Loading | Self::Success { .. } => None,
        }
    }

    /// Maps the success payload, leaving every other variant untouched.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success { status_code, body } => Outcome::Success {
                status_code,
                body: body.map(f),
            },
            Self::Error {
                status_code,
                message,
            } => Outcome::Error {
                status_code,
                message,
            },
            Self::NoConnectivity { message } => Outcome::NoConnectivity { message },
            Self::SessionExpired {
                status_code,
                message,
            } => Outcome::SessionExpired {
                status_code,
                message,
            },
        }
    }

    /// Returns the success body, discarding every other variant.
    pub fn into_body(self) -> Option<T> {
        match self {
            Self::Success { body, .. } => body,
            _ => None,
        }
    }
}
