//! Conversions from external infrastructure errors into domain errors.

use meetbell_domain::MeetbellError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MeetbellError);

impl From<InfraError> for MeetbellError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MeetbellError> for InfraError {
    fn from(value: MeetbellError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoMeetbellError {
    fn into_meetbell(self) -> MeetbellError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MeetbellError */
/* -------------------------------------------------------------------------- */

impl IntoMeetbellError for HttpError {
    fn into_meetbell(self) -> MeetbellError {
        if self.is_timeout() {
            return MeetbellError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return MeetbellError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return MeetbellError::Parse(format!("cannot decode HTTP response: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(status, "");
        }

        MeetbellError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_meetbell())
    }
}

/// Classify a non-success HTTP status.
///
/// Rejected credentials map to `Auth`; everything else is a `Network` error
/// the poll loop may retry.
pub fn status_error(status: reqwest::StatusCode, body: &str) -> MeetbellError {
    let code = status.as_u16();
    let mut message = format!("HTTP {code} {}", status.canonical_reason().unwrap_or("unknown status"));
    let body = body.trim();
    if !body.is_empty() {
        message.push_str(": ");
        message.extend(body.chars().take(200));
    }

    match code {
        401 | 403 => MeetbellError::Auth(message),
        _ => MeetbellError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → MeetbellError */
/* -------------------------------------------------------------------------- */

impl IntoMeetbellError for std::io::Error {
    fn into_meetbell(self) -> MeetbellError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => MeetbellError::Config(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                MeetbellError::Config(format!("permission denied: {self}"))
            }
            _ => MeetbellError::Platform(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(value.into_meetbell())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → MeetbellError */
/* -------------------------------------------------------------------------- */

impl IntoMeetbellError for serde_json::Error {
    fn into_meetbell(self) -> MeetbellError {
        MeetbellError::Parse(format!("invalid JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(value.into_meetbell())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn unauthorized_status_maps_to_auth() {
        let err = status_error(StatusCode::UNAUTHORIZED, "token expired");
        assert_eq!(err, MeetbellError::Auth("HTTP 401 Unauthorized: token expired".into()));
    }

    #[test]
    fn server_status_maps_to_network() {
        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(err, MeetbellError::Network("HTTP 503 Service Unavailable".into()));
    }

    #[test]
    fn io_not_found_maps_to_config() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "token.json");
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, MeetbellError::Config(_)));
    }

    #[test]
    fn json_errors_map_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, MeetbellError::Parse(_)));
    }

    #[tokio::test]
    async fn reqwest_status_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = Client::new()
            .get(server.uri())
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap_err();

        let infra: InfraError = err.into();
        assert!(matches!(infra.0, MeetbellError::Auth(_)));
    }

    #[tokio::test]
    async fn connection_refused_maps_to_network() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = Client::new().get(format!("http://{addr}")).send().await.unwrap_err();
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, MeetbellError::Network(_)));
    }
}
