//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use wwsdk_common::auth::{ExchangeError, TokenManagerError};
use wwsdk_common::graphql::ProjectionError;
use wwsdk_common::normalize::NormalizeError;
use wwsdk_domain::SdkError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SdkError);

impl From<InfraError> for SdkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SdkError> for InfraError {
    fn from(value: SdkError) -> Self {
        InfraError(value)
    }
}

/// Convert any error with an [`InfraError`] mapping into [`SdkError`].
///
/// Intended for `map_err(to_sdk)`.
pub fn to_sdk<E>(err: E) -> SdkError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSdkError {
    fn into_sdk(self) -> SdkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for HttpError {
    fn into_sdk(self) -> SdkError {
        if self.is_timeout() {
            return SdkError::Timeout(self.to_string());
        }

        if self.is_decode() {
            return SdkError::Serialization(format!("failed to decode response body: {self}"));
        }

        if let Some(status) = self.status() {
            return SdkError::Http {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        if self.is_builder() {
            return SdkError::InvalidInput(format!("invalid request: {self}"));
        }

        SdkError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_sdk())
    }
}

/* -------------------------------------------------------------------------- */
/* Token lifecycle errors → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for ExchangeError {
    fn into_sdk(self) -> SdkError {
        match self {
            ExchangeError::Transport(message) => SdkError::Transport(message),
            ExchangeError::Rejected { status, body } => SdkError::Http { status, body },
            ExchangeError::InvalidResponse(message) => SdkError::Serialization(message),
        }
    }
}

impl From<ExchangeError> for InfraError {
    fn from(value: ExchangeError) -> Self {
        InfraError(value.into_sdk())
    }
}

impl IntoSdkError for TokenManagerError {
    fn into_sdk(self) -> SdkError {
        match self {
            TokenManagerError::InvalidCredentialFormat(message) => {
                SdkError::InvalidCredentialFormat(message)
            }
            TokenManagerError::AcquisitionInProgress => SdkError::AcquisitionInProgress,
            TokenManagerError::AlreadyRunning => {
                SdkError::Internal("token manager already running".into())
            }
            other @ (TokenManagerError::NotStarted
            | TokenManagerError::Exchange(_)
            | TokenManagerError::InvalidToken(_)
            | TokenManagerError::Terminal { .. }
            | TokenManagerError::Cancelled) => SdkError::AcquisitionFailed(other.to_string()),
        }
    }
}

impl From<TokenManagerError> for InfraError {
    fn from(value: TokenManagerError) -> Self {
        InfraError(value.into_sdk())
    }
}

/* -------------------------------------------------------------------------- */
/* Projection / normalization errors → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for ProjectionError {
    fn into_sdk(self) -> SdkError {
        match self {
            ProjectionError::InvalidFieldSpec(message) => SdkError::InvalidFieldSpec(message),
            other @ ProjectionError::MissingRequiredField(_) => {
                SdkError::InvalidFieldSpec(other.to_string())
            }
        }
    }
}

impl From<ProjectionError> for InfraError {
    fn from(value: ProjectionError) -> Self {
        InfraError(value.into_sdk())
    }
}

impl IntoSdkError for NormalizeError {
    fn into_sdk(self) -> SdkError {
        match self {
            NormalizeError::InvalidJson(message) => SdkError::Serialization(message),
            NormalizeError::MissingProperty(property) => SdkError::MissingProperty(property),
        }
    }
}

impl From<NormalizeError> for InfraError {
    fn from(value: NormalizeError) -> Self {
        InfraError(value.into_sdk())
    }
}

/* -------------------------------------------------------------------------- */
/* image::ImageError → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for image::ImageError {
    fn into_sdk(self) -> SdkError {
        match self {
            image::ImageError::IoError(err) => SdkError::Io(err.to_string()),
            other => SdkError::InvalidInput(format!("cannot read image dimensions: {other}")),
        }
    }
}

impl From<image::ImageError> for InfraError {
    fn from(value: image::ImageError) -> Self {
        InfraError(value.into_sdk())
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
    fn terminal_failure_maps_to_acquisition_failed() {
        let err = TokenManagerError::Terminal { attempts: 11, last_error: "401".into() };
        match to_sdk(err) {
            SdkError::AcquisitionFailed(msg) => assert!(msg.contains("11 attempts")),
            other => panic!("expected acquisition failure, got {other:?}"),
        }
    }

    #[test]
    fn credential_format_keeps_its_kind() {
        let err = TokenManagerError::InvalidCredentialFormat("client id is empty".into());
        assert_eq!(
            to_sdk(err),
            SdkError::InvalidCredentialFormat("client id is empty".into())
        );
        assert_eq!(to_sdk(TokenManagerError::AcquisitionInProgress), SdkError::AcquisitionInProgress);
    }

    #[test]
    fn rejected_exchange_maps_to_http() {
        let err = ExchangeError::Rejected { status: 401, body: "nope".into() };
        assert_eq!(to_sdk(err), SdkError::Http { status: 401, body: "nope".into() });
    }

    #[test]
    fn normalize_and_projection_errors_map() {
        assert_eq!(
            to_sdk(NormalizeError::MissingProperty("space".into())),
            SdkError::MissingProperty("space".into())
        );
        assert!(matches!(
            to_sdk(ProjectionError::MissingRequiredField("id".into())),
            SdkError::InvalidFieldSpec(_)
        ));
    }

    #[tokio::test]
    async fn http_status_error_maps_to_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        match to_sdk(error) {
            SdkError::Http { status, .. } => assert_eq!(status, 401),
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_maps_to_transport() {
        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get("http://127.0.0.1:1").send().await.unwrap_err();
        assert!(matches!(to_sdk(error), SdkError::Transport(_)));
    }
}
