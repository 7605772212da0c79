// Async HTTP client for the document sharing API.
//
// Base path: /api/
// Auth: Bearer token

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::models::{DocToAdd, DocsToAddResponse, ShareLink};
use crate::transport::TransportConfig;

/// Path segment for the driver licence, which has its own share endpoint.
const DRIVER_LICENSE_PATH: &str = "driver-license";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the sharing endpoints.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted,
/// so each verification session can own its own handle.
#[derive(Debug, Clone)]
pub struct SharingClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SharingClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a bearer token and transport config.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken {
                message: format!("invalid header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/api/` so relative joins land under it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Request a verification link for a document of the given type.
    pub async fn share_document(
        &self,
        doc_type: &str,
        document_id: &str,
        localization: Option<&str>,
    ) -> Result<ShareLink, Error> {
        let path = format!("v2/documents/{doc_type}/{document_id}/share");
        self.get_with_params(&path, &localization_params(localization))
            .await
    }

    /// Request a verification link (QR plus optional barcode) for a driver licence.
    pub async fn share_driver_license(
        &self,
        document_id: &str,
        localization: Option<&str>,
    ) -> Result<ShareLink, Error> {
        let path = format!("v2/documents/{DRIVER_LICENSE_PATH}/{document_id}/share");
        self.get_with_params(&path, &localization_params(localization))
            .await
    }

    /// List the document types the user can still add.
    pub async fn docs_to_add(&self) -> Result<Vec<DocToAdd>, Error> {
        let resp: DocsToAddResponse = self.get_with_params("v1/documents/add", &[]).await?;
        Ok(resp.documents)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        handle_response(resp).await
    }
}

fn localization_params(localization: Option<&str>) -> Vec<(&'static str, String)> {
    localization
        .map(|l| vec![("localization", l.to_owned())])
        .unwrap_or_default()
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(ErrorResponse {
            message: Some(message),
        }) => message,
        _ if raw.is_empty() => status.to_string(),
        _ => raw,
    };

    Error::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_api_prefix() {
        let client = SharingClient::from_reqwest("https://docs.example", reqwest::Client::new())
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://docs.example/api/");
    }

    #[test]
    fn base_url_keeps_existing_api_prefix() {
        let client =
            SharingClient::from_reqwest("https://docs.example/api/", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "https://docs.example/api/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = SharingClient::from_reqwest("not a url", reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
