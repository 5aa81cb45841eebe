use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::{AuthorizationManager, CredentialGate};
use crate::decode::decode_json;
use crate::error::{ErrorBody, SpotifyError};
use crate::query::QueryItems;
use crate::request::{RequestSpec, RequestTarget};
use crate::scope::Scope;
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Client for the Spotify Web API.
///
/// Every call goes through [`SpotifyApi::execute`]: the credential is checked
/// (and refreshed if needed) by the [`CredentialGate`], the request is
/// dispatched through the [`Transport`], and the response is classified by
/// status. Calls are independent and may run concurrently; they share the
/// authorization manager.
pub struct SpotifyApi<A: ?Sized, T = ReqwestTransport> {
    gate: CredentialGate<A>,
    transport: Arc<T>,
    base_url: String,
}

impl<A: ?Sized, T> Clone for SpotifyApi<A, T> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
        }
    }
}

impl<A: AuthorizationManager + ?Sized> SpotifyApi<A, ReqwestTransport> {
    pub fn new(authorization_manager: Arc<A>) -> Self {
        Self::with_transport(authorization_manager, ReqwestTransport::new())
    }
}

impl<A, T> SpotifyApi<A, T>
where
    A: AuthorizationManager + ?Sized,
    T: Transport,
{
    pub fn with_transport(authorization_manager: Arc<A>, transport: T) -> Self {
        Self {
            gate: CredentialGate::new(authorization_manager),
            transport: Arc::new(transport),
            base_url: SPOTIFY_API_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base url, e.g. to point at a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn authorization_manager(&self) -> &Arc<A> {
        self.gate.authorization_manager()
    }

    /// The absolute url of `target`. Query items whose value is `None` are
    /// dropped.
    pub fn url(&self, target: &RequestTarget) -> Result<Url, SpotifyError> {
        match target {
            RequestTarget::Path { path, query } => {
                let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
                if !query.is_empty() {
                    url.set_query(Some(&query.to_query_string()));
                }
                Ok(url)
            }
            RequestTarget::Href(url) => Ok(url.clone()),
        }
    }

    /// Sends `spec` and returns the raw response if its status is 2xx.
    ///
    /// Nothing is retried: credential, encoding, transport and http failures
    /// are all returned to the caller.
    pub async fn execute<B>(&self, spec: &RequestSpec<B>) -> Result<HttpResponse, SpotifyError>
    where
        B: Serialize + Sync,
    {
        let url = self.url(spec.target())?;
        let access_token = self.gate.ensure(spec.required_scopes()).await?;
        let headers = (spec.make_headers())(&access_token)?;
        let body = spec.body().encode().map_err(SpotifyError::Encode)?;

        tracing::trace!("{} {}", spec.method(), url);
        if let Some(text) = body.as_deref().and_then(|body| std::str::from_utf8(body).ok()) {
            tracing::trace!("request body: {}", text);
        }

        let response = self
            .transport
            .perform(HttpRequest {
                method: spec.method().clone(),
                url: url.clone(),
                headers,
                body,
            })
            .await?;

        tracing::debug!("{} {} -> {}", spec.method(), url, response.status);

        if response.status.is_success() {
            Ok(response)
        } else {
            Err(SpotifyError::Http {
                status: response.status,
                body: ErrorBody::from_bytes(&response.body),
            })
        }
    }

    /// [`SpotifyApi::execute`], then decode the body as JSON into `R`.
    pub async fn execute_json<B, R>(&self, spec: &RequestSpec<B>) -> Result<R, SpotifyError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self.execute(spec).await?;
        Ok(decode_json(&response.body, Some(response.status))?)
    }

    /// [`SpotifyApi::execute`] for endpoints that answer without a meaningful
    /// body, e.g. `204 No Content`.
    pub async fn execute_no_content<B>(&self, spec: &RequestSpec<B>) -> Result<(), SpotifyError>
    where
        B: Serialize + Sync,
    {
        self.execute(spec).await.map(|_| ())
    }

    /// `GET` without a body.
    pub async fn get(
        &self,
        path: &str,
        query: QueryItems,
        scopes: &BTreeSet<Scope>,
    ) -> Result<HttpResponse, SpotifyError> {
        let spec = RequestSpec::get(path)
            .with_query(query)
            .with_scopes(scopes.iter().copied());
        self.execute(&spec).await
    }

    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: QueryItems,
        scopes: &BTreeSet<Scope>,
    ) -> Result<R, SpotifyError> {
        let response = self.get(path, query, scopes).await?;
        Ok(decode_json(&response.body, Some(response.status))?)
    }

    /// `GET` an absolute url returned by the API, such as the `next` link of a
    /// page.
    pub async fn get_href<R: DeserializeOwned>(
        &self,
        href: &str,
        scopes: &BTreeSet<Scope>,
    ) -> Result<R, SpotifyError> {
        let spec = RequestSpec::href(Url::parse(href)?).with_scopes(scopes.iter().copied());
        self.execute_json(&spec).await
    }
}
