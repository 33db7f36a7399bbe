//! Maps a finished exchange or a transport failure to an [`Outcome`].

use std::error::Error as _;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::{Outcome, ServerErrorPolicy};

pub const NO_CONNECTIVITY_MESSAGE: &str = "No internet connection";
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";
pub const FALLBACK_MESSAGE: &str = "Something went wrong.";

/// Classifies a failure raised by the transport before a response arrived.
///
/// Connect failures (including host resolution) win over timeouts, which win
/// over generic I/O failures. A TLS handshake that fails against a reachable
/// host is an I/O failure, not a connectivity one. Anything else keeps its own
/// text.
pub fn classify_transport_error<T>(err: &reqwest::Error) -> Outcome<T> {
    if err.is_connect() {
        if is_tls_failure(err) {
            return Outcome::error(NETWORK_ERROR_MESSAGE);
        }
        return Outcome::NoConnectivity {
            message: NO_CONNECTIVITY_MESSAGE.to_owned(),
        };
    }
    if err.is_timeout() {
        return Outcome::error(TIMEOUT_MESSAGE);
    }
    if err.is_request() || err.is_body() || has_io_source(err) {
        return Outcome::error(NETWORK_ERROR_MESSAGE);
    }
    unclassified(&err.to_string())
}

/// Classifies a completed response from its status and raw body text.
pub fn classify_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    server_errors: ServerErrorPolicy,
) -> Outcome<T> {
    let code = status.as_u16();

    if status.is_success() {
        return match decode_body(body) {
            Ok(body) => Outcome::Success {
                status_code: code,
                body,
            },
            Err(err) => unclassified(&format!("failed to decode response body: {err}")),
        };
    }

    let message = extract_message(body, status);
    if status.is_redirection() {
        Outcome::http_error(code, message)
    } else if status == StatusCode::UNAUTHORIZED {
        Outcome::SessionExpired {
            status_code: code,
            message,
        }
    } else if status.is_client_error() {
        Outcome::http_error(code, message)
    } else if status.is_server_error() {
        match server_errors {
            ServerErrorPolicy::SessionExpired => Outcome::SessionExpired {
                status_code: code,
                message,
            },
            ServerErrorPolicy::Error => Outcome::http_error(code, message),
        }
    } else {
        Outcome::http_error(code, message)
    }
}

/// Pulls a human readable message out of an error response body.
///
/// Prefers the `message` field of a JSON object, then `error`, then the
/// status's canonical reason phrase.
pub fn extract_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .as_ref()
        .and_then(JsonValue::as_object)
        .and_then(|object| {
            ["message", "error"]
                .iter()
                .find_map(|field| object.get(*field).and_then(field_text))
        })
        .unwrap_or_else(|| status_description(status))
}

/// Any failure outside the transport and status taxonomy.
pub(crate) fn unclassified<T>(text: &str) -> Outcome<T> {
    let text = text.trim();
    if text.is_empty() {
        Outcome::error(FALLBACK_MESSAGE)
    } else {
        Outcome::error(text)
    }
}

fn decode_body<T: DeserializeOwned>(body: &str) -> serde_json::Result<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body).map(Some)
}

fn field_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) if text.is_empty() => None,
        JsonValue::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn status_description(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// The TLS stack reports protocol and certificate errors as `InvalidData`
/// and a peer hanging up mid-handshake as `UnexpectedEof`. Refused
/// connections and resolver failures use other kinds.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

fn has_io_source(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.is::<std::io::Error>() {
            return true;
        }
        source = inner.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde::Deserialize;
    use serde_json::{json, Value as JsonValue};

    use super::{classify_response, extract_message, unclassified, FALLBACK_MESSAGE};
    use crate::{Outcome, ServerErrorPolicy};

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u64,
        name: String,
    }

    fn classify(status: u16, body: &str) -> Outcome<JsonValue> {
        let status = StatusCode::from_u16(status).expect("valid status");
        classify_response(status, body, ServerErrorPolicy::default())
    }

    #[test]
    fn message_wins_over_error_field() {
        let body = r#"{"message":"m","error":"e"}"#;
        assert_eq!(extract_message(body, StatusCode::BAD_REQUEST), "m");
    }

    #[test]
    fn error_field_used_when_message_missing() {
        let body = r#"{"error":"not found"}"#;
        assert_eq!(extract_message(body, StatusCode::NOT_FOUND), "not found");
    }

    #[test]
    fn status_description_used_for_non_json_body() {
        assert_eq!(
            extract_message("<html>oops</html>", StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
        assert_eq!(extract_message(r#"["message"]"#, StatusCode::CONFLICT), "Conflict");
        assert_eq!(
            extract_message("", StatusCode::from_u16(599).expect("valid status")),
            "HTTP 599"
        );
    }

    #[test]
    fn non_string_message_is_rendered_as_json() {
        let body = r#"{"message":null,"error":{"code":7}}"#;
        assert_eq!(
            extract_message(body, StatusCode::BAD_REQUEST),
            r#"{"code":7}"#
        );
    }

    #[test]
    fn success_statuses_decode_body() {
        for status in [200u16, 201, 202, 204, 299] {
            let status = StatusCode::from_u16(status).expect("valid status");
            let outcome: Outcome<User> = classify_response(
                status,
                r#"{"id":1,"name":"Kit"}"#,
                ServerErrorPolicy::default(),
            );
            assert_eq!(
                outcome,
                Outcome::Success {
                    status_code: status.as_u16(),
                    body: Some(User {
                        id: 1,
                        name: "Kit".to_owned()
                    })
                }
            );
        }
    }

    #[test]
    fn empty_success_body_is_none() {
        assert_eq!(
            classify(204, ""),
            Outcome::Success {
                status_code: 204,
                body: None
            }
        );
    }

    #[test]
    fn undecodable_success_body_is_error_without_status() {
        let outcome: Outcome<User> =
            classify_response(StatusCode::OK, "not json", ServerErrorPolicy::default());
        match outcome {
            Outcome::Error {
                status_code: None,
                message,
            } => assert!(message.starts_with("failed to decode response body")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn unauthorized_is_session_expired() {
        assert_eq!(
            classify(401, r#"{"message":"token expired"}"#),
            Outcome::SessionExpired {
                status_code: 401,
                message: "token expired".to_owned()
            }
        );
    }

    #[test]
    fn other_client_errors_are_errors() {
        assert_eq!(
            classify(404, &json!({"error": "not found"}).to_string()),
            Outcome::Error {
                status_code: Some(404),
                message: "not found".to_owned()
            }
        );
        assert_eq!(
            classify(403, ""),
            Outcome::Error {
                status_code: Some(403),
                message: "Forbidden".to_owned()
            }
        );
    }

    #[test]
    fn server_errors_follow_policy() {
        for code in [500u16, 502, 503, 599] {
            let outcome = classify(code, "");
            assert!(
                matches!(outcome, Outcome::SessionExpired { status_code, .. } if status_code == code),
                "{code} must map to SessionExpired by default"
            );

            let status = StatusCode::from_u16(code).expect("valid status");
            let outcome: Outcome<JsonValue> =
                classify_response(status, "", ServerErrorPolicy::Error);
            assert_eq!(outcome.status_code(), Some(code));
            assert!(matches!(outcome, Outcome::Error { .. }));
        }
    }

    #[test]
    fn redirects_and_informational_statuses_are_errors() {
        assert_eq!(
            classify(302, ""),
            Outcome::Error {
                status_code: Some(302),
                message: "Found".to_owned()
            }
        );
        assert!(matches!(
            classify(101, ""),
            Outcome::Error {
                status_code: Some(101),
                ..
            }
        ));
    }

    #[test]
    fn blank_unclassified_text_falls_back() {
        assert_eq!(
            unclassified::<()>("  "),
            Outcome::Error {
                status_code: None,
                message: FALLBACK_MESSAGE.to_owned()
            }
        );
    }
}
