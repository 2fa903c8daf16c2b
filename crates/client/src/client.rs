use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

use keyward_core::wire::{ERROR_CODE_HEADER, ErrorBody, TOTAL_COUNT_HEADER};
use keyward_core::{
    AuthError, AuthResult, Authorization, AuthorizationFilter, AuthorizationPage,
    AuthorizationService, AuthorizationUpdate, ErrorCode, FindOptions, Id, ListQuery,
    NewAuthorization,
};

/// Connection settings for [`AuthorizationClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server address including any mount prefix, e.g. `http://localhost:8080/v1`.
    pub base_url: String,
    /// Per-request deadline. Elapsed requests fail with [`AuthError::Canceled`].
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }
}

/// [`AuthorizationService`] over HTTP.
///
/// Status codes and error headers are translated back into the same
/// [`AuthError`] kinds the in-memory store returns.
#[derive(Debug, Clone)]
pub struct AuthorizationClient {
    base: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AuthorizationsBody {
    auths: Vec<Authorization>,
}

impl AuthorizationClient {
    pub fn new(base_url: impl Into<String>) -> AuthResult<Self> {
        Self::from_config(ClientConfig::new(base_url))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> AuthResult<Self> {
        Self::from_config(ClientConfig {
            base_url: base_url.into(),
            timeout: Some(timeout),
        })
    }

    pub fn from_config(config: ClientConfig) -> AuthResult<Self> {
        let base = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base)
            .map_err(|e| AuthError::invalid_argument(format!("invalid base url {base:?}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AuthError::internal(format!("failed to build http client: {e}")))?;

        Ok(Self { base, http })
    }

    fn collection_url(&self) -> String {
        format!("{}/authorizations", self.base)
    }

    fn item_url(&self, id: &Id) -> String {
        format!("{}/authorizations/{id}", self.base)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        tracing::debug!(%method, %url, "authorization request");
        self.http.request(method, url)
    }

    async fn send(&self, req: RequestBuilder) -> AuthResult<Response> {
        let resp = req.send().await.map_err(transport_error)?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(decode_error(resp).await)
        }
    }

    async fn list(&self, query: &ListQuery) -> AuthResult<AuthorizationPage> {
        let req = self
            .request(Method::GET, self.collection_url())
            .query(&query.to_query_pairs());
        let resp = self.send(req).await?;

        let total = resp
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        let body: AuthorizationsBody = decode_json(resp).await?;

        Ok(AuthorizationPage {
            total: total.unwrap_or(body.auths.len()),
            items: body.auths,
        })
    }
}

#[async_trait::async_trait]
impl AuthorizationService for AuthorizationClient {
    async fn create_authorization(&self, new: NewAuthorization) -> AuthResult<Authorization> {
        let req = self.request(Method::POST, self.collection_url()).json(&new);
        decode_json(self.send(req).await?).await
    }

    async fn find_authorization_by_id(&self, id: &Id) -> AuthResult<Authorization> {
        let req = self.request(Method::GET, self.item_url(id));
        decode_json(self.send(req).await?).await
    }

    async fn find_authorization_by_token(&self, token: &str) -> AuthResult<Authorization> {
        let query = ListQuery::new(AuthorizationFilter::by_token(token), FindOptions::default());
        self.list(&query)
            .await?
            .items
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::not_found("authorization not found"))
    }

    async fn find_authorizations(
        &self,
        filter: &AuthorizationFilter,
        options: &FindOptions,
    ) -> AuthResult<AuthorizationPage> {
        self.list(&ListQuery::new(filter.clone(), options.clone())).await
    }

    async fn update_authorization(
        &self,
        id: &Id,
        update: AuthorizationUpdate,
    ) -> AuthResult<Authorization> {
        let req = self.request(Method::PATCH, self.item_url(id)).json(&update);
        decode_json(self.send(req).await?).await
    }

    async fn delete_authorization(&self, id: &Id) -> AuthResult<()> {
        let req = self.request(Method::DELETE, self.item_url(id));
        self.send(req).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::canceled(format!("request deadline elapsed: {err}"))
    } else {
        AuthError::internal(format!("transport error: {err}"))
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(resp: Response) -> AuthResult<T> {
    let bytes = resp.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::internal(format!("failed to decode response body: {e}")))
}

async fn decode_error(resp: Response) -> AuthError {
    let status = resp.status();
    let header = resp
        .headers()
        .get(ERROR_CODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = resp.bytes().await.unwrap_or_default();
    error_from_parts(status, header.as_deref(), &body)
}

/// Rebuild an [`AuthError`] from an error response.
///
/// The code header wins, then the body's `error` field, then the status code.
pub(crate) fn error_from_parts(status: StatusCode, header: Option<&str>, body: &[u8]) -> AuthError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();

    let code = header
        .and_then(|h| h.parse::<ErrorCode>().ok())
        .or_else(|| parsed.as_ref().and_then(|b| b.error.parse().ok()))
        .unwrap_or_else(|| ErrorCode::from_http_status(status.as_u16()));

    let message = parsed
        .map(|b| b.message)
        .unwrap_or_else(|| format!("unexpected response status {status}"));

    AuthError::from_code(code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_code_takes_precedence() {
        let err = error_from_parts(
            StatusCode::NOT_FOUND,
            Some("conflict"),
            br#"{"error":"not_found","message":"token already in use"}"#,
        );
        assert_eq!(err, AuthError::conflict("token already in use"));
    }

    #[test]
    fn body_code_used_without_header() {
        let err = error_from_parts(
            StatusCode::NOT_FOUND,
            None,
            br#"{"error":"not_found","message":"authorization not found"}"#,
        );
        assert_eq!(err, AuthError::not_found("authorization not found"));
    }

    #[test]
    fn bare_status_falls_back_to_table() {
        assert!(matches!(
            error_from_parts(StatusCode::BAD_REQUEST, None, b"oops"),
            AuthError::InvalidArgument(_)
        ));
        assert!(matches!(
            error_from_parts(StatusCode::BAD_GATEWAY, None, b""),
            AuthError::Internal(_)
        ));
        assert!(matches!(
            error_from_parts(StatusCode::REQUEST_TIMEOUT, None, b""),
            AuthError::Canceled(_)
        ));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            AuthorizationClient::new("not a url"),
            Err(AuthError::InvalidArgument(_))
        ));
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let client = AuthorizationClient::new("http://localhost:8080/v1/").unwrap();
        assert_eq!(client.collection_url(), "http://localhost:8080/v1/authorizations");
        assert_eq!(
            client.item_url(&"020f755c3c082000".parse().unwrap()),
            "http://localhost:8080/v1/authorizations/020f755c3c082000"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_internal() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = AuthorizationClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.find_authorization_by_id(&Id::from(1)).await.unwrap_err();
        assert!(matches!(err, AuthError::Internal(_) | AuthError::Canceled(_)), "{err:?}");
    }
}
