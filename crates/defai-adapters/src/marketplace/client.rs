use reqwest::{Method, RequestBuilder, Url, multipart};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use super::{
    ElementStats, ElementSummary, LoginRequest, LoginResponse, MarketplaceError, Operation,
    PublishRequest, PublishResponse, RemoteValidation, StatsResponse, error::error_message,
    types::ListResponse,
};

pub const DEFAULT_API_URL: &str = "https://api.defai.com";
const BUNDLE_FIELD: &str = "bundle";

/// HTTP client for the DEFAI marketplace. No retries and no timeout.
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    http: reqwest::Client,
    base: Url,
    api_key: Option<String>,
}

impl MarketplaceClient {
    pub fn new(api_url: &str, api_key: Option<String>) -> Result<Self, MarketplaceError> {
        let invalid = |reason: String| MarketplaceError::InvalidUrl {
            url: api_url.to_string(),
            reason,
        };
        let trimmed = api_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(invalid("expected an http:// or https:// URL".into()));
        }
        let base = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("the URL cannot carry a path".into()));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("defai-element/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| MarketplaceError::Client { source })?;

        Ok(Self {
            http,
            base,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    /// Exchange credentials for an API token.
    #[instrument(skip_all, fields(%email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, MarketplaceError> {
        let request = self
            .request(Method::POST, &["auth", "login"])
            .json(&LoginRequest { email, password });
        let response: LoginResponse = send(Operation::Login, request).await?;
        info!(user_id = %response.user.id, "logged in");
        Ok(response)
    }

    /// Upload a bundle archive with its listing terms.
    #[instrument(skip_all, fields(bundle = %publish.bundle.display(), tier = %publish.tier))]
    pub async fn publish(&self, publish: &PublishRequest) -> Result<PublishResponse, MarketplaceError> {
        let bytes = tokio::fs::read(&publish.bundle)
            .await
            .map_err(|source| MarketplaceError::Bundle {
                operation: Operation::Publish,
                path: publish.bundle.clone(),
                source,
            })?;
        let file_name = publish
            .bundle
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "element.zip".into());
        debug!(size = bytes.len(), "uploading bundle");

        let bundle = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")
            .map_err(|source| MarketplaceError::Request {
                operation: Operation::Publish,
                source,
            })?;
        let form = multipart::Form::new()
            .part(BUNDLE_FIELD, bundle)
            .text("tier", publish.tier.as_str())
            .text("price", publish.price.to_string())
            .text("royalty", publish.royalty.to_string());

        let request = self
            .request(Method::POST, &["elements", "publish"])
            .multipart(form);
        let response: PublishResponse = send(Operation::Publish, request).await?;
        info!(element_id = %response.element_id, "published");
        Ok(response)
    }

    /// Stats for one element, or for all of the user's elements.
    #[instrument(skip(self))]
    pub async fn stats(
        &self,
        element_id: Option<&str>,
        days: Option<u32>,
    ) -> Result<Vec<ElementStats>, MarketplaceError> {
        let mut url = match element_id {
            Some(id) => self.url(&["elements", id, "stats"]),
            None => self.url(&["elements", "stats"]),
        };
        if let Some(days) = days {
            url.query_pairs_mut().append_pair("days", &days.to_string());
        }
        let response: StatsResponse =
            send(Operation::Stats, self.request_url(Method::GET, url)).await?;
        Ok(response.into_vec())
    }

    /// The user's elements; `include_all` also returns unpublished drafts.
    #[instrument(skip(self))]
    pub async fn list(&self, include_all: bool) -> Result<Vec<ElementSummary>, MarketplaceError> {
        let mut url = self.url(&["elements"]);
        if include_all {
            url.query_pairs_mut().append_pair("all", "true");
        }
        let response: ListResponse =
            send(Operation::List, self.request_url(Method::GET, url)).await?;
        Ok(response.into_vec())
    }

    /// Server-side manifest validation.
    #[instrument(skip_all)]
    pub async fn validate(&self, manifest: &Value) -> Result<RemoteValidation, MarketplaceError> {
        let request = self
            .request(Method::POST, &["elements", "validate"])
            .json(&json!({ "manifest": manifest }));
        send(Operation::Validate, request).await
    }

    /// The base URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Only cannot-be-a-base URLs refuse segments; `new` rejects those.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.request_url(method, self.url(segments))
    }

    fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.http.request(method, url);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

async fn send<T: DeserializeOwned>(
    operation: Operation,
    request: RequestBuilder,
) -> Result<T, MarketplaceError> {
    let response = request
        .send()
        .await
        .map_err(|source| MarketplaceError::Request { operation, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(%status, %body, "marketplace error response");
        return Err(MarketplaceError::Status {
            operation,
            status: status.as_u16(),
            message: error_message(status.as_u16(), &body),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|source| MarketplaceError::Request { operation, source })
}
