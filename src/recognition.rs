//! HTTP client for the serial-number recognition service.
//!
//! Sends a label photo to a hosted generative-vision API and returns a
//! best-effort extracted serial number. Recognition is an optional
//! accelerator for data entry: "no match" is a normal outcome
//! (`Ok(None)`), while transport and configuration failures are errors.
//! The client never retries and never caches. Provides both async and
//! blocking variants behind feature flags.

/// Base URL for the hosted recognition API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for the extraction call.
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Header carrying the API credential.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Extraction instruction sent alongside the photo.
const SERIAL_PROMPT: &str = "This is a photo of a medical equipment label. Identify and extract \
     the serial number (SN). Return only the bare serial string, without labels or any other \
     text. If no serial number is visible, return an empty string.";

/// Generates a recognition client (async or blocking) with builder,
/// methods, and tests.
macro_rules! define_recognizer {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// API credential for the recognition service.
            api_key: Option<SecretString>,
            /// Base URL override (for testing).
            base_url: Option<String>,
            /// Model override.
            model: Option<String>,
        }

        impl $builder {
            /// Sets the API credential.
            #[inline]
            #[must_use]
            pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
                self.api_key = Some(SecretString::from(key.into()));
                self
            }

            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Overrides the recognition model.
            #[inline]
            #[must_use]
            pub fn model<T: Into<String>>(mut self, model: T) -> Self {
                self.model = Some(model.into());
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`InventoryError::MissingApiKey`] if no credential
            /// was provided — a configuration error, surfaced rather than
            /// silently disabling recognition. Returns
            /// [`InventoryError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let api_key = self.api_key.ok_or(InventoryError::MissingApiKey)?;
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
                let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned());
                tracing::debug!(base_url = %base_url, model = %model, "building recognition client");
                let http = <$http_type>::builder().build()?;

                Ok($client {
                    http,
                    api_key,
                    base_url,
                    model,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// API credential.
            api_key: SecretString,
            /// API base URL.
            base_url: String,
            /// Recognition model name.
            model: String,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    api_key: None,
                    base_url: None,
                    model: None,
                }
            }

            /// Extracts a serial number from a JPEG label photo.
            ///
            /// Sends a single deterministic generate-content request
            /// (zero temperature, short output cap). Returns
            /// `Ok(Some(serial))` on a match and `Ok(None)` when the
            /// service finds no serial in the image — the caller should
            /// fall back to manual entry, not treat this as a failure.
            /// A late-arriving result is the caller's to apply or drop;
            /// no sequencing is attempted here.
            ///
            /// # Errors
            ///
            /// Returns [`InventoryError::Http`] on transport failure and
            /// [`InventoryError::Api`] when the service answers with a
            /// non-success status.
            #[tracing::instrument(skip_all, fields(image_len = image.len()))]
            pub $($async_kw)? fn recognize_serial(
                &self,
                image: &[u8],
            ) -> Result<Option<String>> {
                let request = RecognizeRequest::for_jpeg(image, SERIAL_PROMPT);
                let url = format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.base_url, self.model
                );
                tracing::trace!(url = %url, "sending recognition request");
                let response: $resp_type = self
                    .http
                    .post(&url)
                    .header(API_KEY_HEADER, self.api_key.expose_secret())
                    .header(CONTENT_TYPE, "application/json")
                    .json(&request)
                    .send()
                    $( .$await_ext )?
                    ?;

                let status = response.status();
                tracing::debug!(status = %status, "received recognition response");
                if status.is_success() {
                    let body = response.text() $( .$await_ext )? ?;
                    let parsed: RecognizeResponse =
                        serde_json::from_str(&body).map_err(InventoryError::from)?;
                    Ok(parsed.serial_text())
                } else {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    tracing::debug!(status = status.as_u16(), message = %message, "recognition API error");
                    Err(InventoryError::Api {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_recognizer {
    //! Async recognition client.

    use reqwest::header::CONTENT_TYPE;
    use secrecy::{ExposeSecret, SecretString};

    use super::{API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_MODEL, SERIAL_PROMPT};
    use crate::error::{InventoryError, Result};
    use crate::models::{RecognizeRequest, RecognizeResponse};

    define_recognizer! {
        client_name: RecognitionClient,
        builder_name: RecognitionClientBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        client_doc: "Async client for the serial-number recognition service.\n\nUse [`RecognitionClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`RecognitionClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_recognizer {
    //! Blocking (synchronous) recognition client.

    use reqwest::header::CONTENT_TYPE;
    use secrecy::{ExposeSecret, SecretString};

    use super::{API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_MODEL, SERIAL_PROMPT};
    use crate::error::{InventoryError, Result};
    use crate::models::{RecognizeRequest, RecognizeResponse};

    define_recognizer! {
        client_name: RecognitionBlockingClient,
        builder_name: RecognitionBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the serial-number recognition service.\n\nUse [`RecognitionBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`RecognitionBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_recognizer::{RecognitionClient, RecognitionClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_recognizer::{RecognitionBlockingClient, RecognitionBlockingClientBuilder};

#[cfg(all(test, feature = "async"))]
mod wire_tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::RecognitionClient;
    use crate::error::InventoryError;

    /// Endpoint path for the default model.
    const ENDPOINT: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

    async fn mock_client(server: &MockServer) -> RecognitionClient {
        RecognitionClient::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn recognizes_serial_from_label_photo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    {"content": {"parts": [{"text": "  SN-12345 \n"}]}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let result = client.recognize_serial(b"\xff\xd8\xff fake jpeg").await;
        assert_eq!(result.unwrap().as_deref(), Some("SN-12345"));
    }

    #[tokio::test]
    async fn blank_answer_is_no_match_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    {"content": {"parts": [{"text": ""}]}}
                ]
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let result = client.recognize_serial(b"fake jpeg").await;
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_candidates_is_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let result = client.recognize_serial(b"fake jpeg").await;
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(403).set_body_string("key rejected"))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client.recognize_serial(b"fake jpeg").await.unwrap_err();
        assert!(
            matches!(err, InventoryError::Api { status, message } if status == 403 && message == "key rejected")
        );
    }

    #[tokio::test]
    async fn custom_model_changes_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/other-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    {"content": {"parts": [{"text": "SN-9"}]}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = RecognitionClient::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .model("other-model")
            .build()
            .unwrap();
        let result = client.recognize_serial(b"fake jpeg").await;
        assert_eq!(result.unwrap().as_deref(), Some("SN-9"));
    }
}
