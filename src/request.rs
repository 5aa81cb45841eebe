use std::collections::BTreeSet;

use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::headers::{self, MakeHeaders};
use crate::query::QueryItems;
use crate::scope::Scope;

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// A path appended to the API base url, e.g. `/me/player/play`.
    Path { path: String, query: QueryItems },
    /// An absolute url returned by the API, e.g. the `next` link of a page.
    Href(Url),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody<B> {
    Empty,
    /// Serialized with `serde_json` right before dispatch.
    Json(B),
    /// Sent as is, e.g. a base64 encoded image.
    Raw(Vec<u8>),
}

impl<B: Serialize> RequestBody<B> {
    pub(crate) fn encode(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        match self {
            RequestBody::Empty => Ok(None),
            RequestBody::Json(body) => serde_json::to_vec(body).map(Some),
            RequestBody::Raw(bytes) => Ok(Some(bytes.clone())),
        }
    }
}

/// Everything needed to build one request to the Web API.
///
/// The headers are produced by a [`MakeHeaders`] function because the access
/// token is only known once the credential has been refreshed, right before
/// the request is sent.
#[derive(Debug, Clone)]
pub struct RequestSpec<B = ()> {
    target: RequestTarget,
    method: Method,
    make_headers: MakeHeaders,
    body: RequestBody<B>,
    required_scopes: BTreeSet<Scope>,
}

impl RequestSpec<()> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            target: RequestTarget::Path {
                path: path.into(),
                query: QueryItems::new(),
            },
            method,
            make_headers: headers::bearer_authorization,
            body: RequestBody::Empty,
            required_scopes: BTreeSet::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `GET` request to an absolute url previously returned by the API.
    pub fn href(url: Url) -> Self {
        Self {
            target: RequestTarget::Href(url),
            method: Method::GET,
            make_headers: headers::bearer_authorization,
            body: RequestBody::Empty,
            required_scopes: BTreeSet::new(),
        }
    }
}

impl<B> RequestSpec<B> {
    /// Replaces the query items. Ignored for [`RequestTarget::Href`], whose
    /// query is part of the url.
    pub fn with_query(mut self, query: QueryItems) -> Self {
        if let RequestTarget::Path { query: current, .. } = &mut self.target {
            *current = query;
        }
        self
    }

    pub fn with_headers(mut self, make_headers: MakeHeaders) -> Self {
        self.make_headers = make_headers;
        self
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.required_scopes = scopes.into_iter().collect();
        self
    }

    /// Sets a JSON body and switches the headers to bearer authorization plus
    /// the JSON content type.
    pub fn with_json_body<C: Serialize>(self, body: C) -> RequestSpec<C> {
        RequestSpec {
            target: self.target,
            method: self.method,
            make_headers: headers::bearer_authorization_and_content_type_json,
            body: RequestBody::Json(body),
            required_scopes: self.required_scopes,
        }
    }

    pub fn with_raw_body(mut self, body: Vec<u8>) -> Self {
        self.body = RequestBody::Raw(body);
        self
    }

    pub fn target(&self) -> &RequestTarget {
        &self.target
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn make_headers(&self) -> MakeHeaders {
        self.make_headers
    }

    pub fn body(&self) -> &RequestBody<B> {
        &self.body
    }

    pub fn required_scopes(&self) -> &BTreeSet<Scope> {
        &self.required_scopes
    }
}
