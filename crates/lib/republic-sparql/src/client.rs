//! HTTP execution of SPARQL queries.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::model::{
    QueryResult,
    RdfJsonDocument,
    ResultsDocument,
    Triple,
    flatten_rdf_json,
};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
const RDF_JSON: &str = "application/rdf+json";
const MAX_ERROR_BODY: usize = 512;

pub type SparqlFuture<'a, T> = BoxFuture<'a, Result<T, SparqlError>>;

/// Failures of a remote call, always carrying the endpoint URL.
#[derive(Debug, Error)]
pub enum SparqlError {
    #[error("SPARQL query failed for {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("SPARQL query failed for {endpoint}: HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("SPARQL query failed for {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl SparqlError {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// Something that can run SELECT, ASK and CONSTRUCT text.
pub trait SparqlExecutor: Send + Sync {
    fn endpoint(&self) -> &str;

    fn select<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, QueryResult>;

    fn ask<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, bool>;

    fn construct<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, Vec<Triple>>;
}

/// Configuration for [`SparqlClient`].
#[derive(Debug, Clone)]
pub struct SparqlClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl SparqlClientConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("republic-mcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// SPARQL 1.1 protocol client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    endpoint: String,
    user_agent: String,
    http: reqwest::Client,
}

impl SparqlClient {
    /// Builds a client; the timeout is enforced by the HTTP transport.
    ///
    /// # Errors
    /// Returns [`SparqlError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: SparqlClientConfig) -> Result<Self, SparqlError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| SparqlError::Transport {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        Ok(Self {
            endpoint: config.endpoint,
            user_agent: config.user_agent,
            http,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, query: &str, accept: &str) -> Result<T, SparqlError> {
        debug!(endpoint = %self.endpoint, query, "executing SPARQL query");
        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, accept)
            .header(USER_AGENT, &self.user_agent)
            .form(&[("query", query)])
            .send()
            .await
            .map_err(|source| self.transport(source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SparqlError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body: truncate(body.trim()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| self.transport(source))?;
        serde_json::from_slice(&bytes).map_err(|err| SparqlError::Decode {
            endpoint: self.endpoint.clone(),
            message: err.to_string(),
        })
    }

    fn transport(&self, source: reqwest::Error) -> SparqlError {
        SparqlError::Transport {
            endpoint: self.endpoint.clone(),
            source,
        }
    }

    fn missing(&self, what: &str) -> SparqlError {
        SparqlError::Decode {
            endpoint: self.endpoint.clone(),
            message: format!("response has no {what}"),
        }
    }
}

impl SparqlExecutor for SparqlClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn select<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, QueryResult> {
        Box::pin(async move {
            let document: ResultsDocument = self.fetch(query, SPARQL_RESULTS_JSON).await?;
            let results = document.results.ok_or_else(|| self.missing("results"))?;
            let result = QueryResult::from_rows(&document.head.vars, results.bindings);
            debug!(endpoint = %self.endpoint, rows = result.len(), "SPARQL select finished");
            Ok(result)
        })
    }

    fn ask<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, bool> {
        Box::pin(async move {
            let document: ResultsDocument = self.fetch(query, SPARQL_RESULTS_JSON).await?;
            document.boolean.ok_or_else(|| self.missing("boolean"))
        })
    }

    fn construct<'a>(&'a self, query: &'a str) -> SparqlFuture<'a, Vec<Triple>> {
        Box::pin(async move {
            let document: RdfJsonDocument = self.fetch(query, RDF_JSON).await?;
            Ok(flatten_rdf_json(document))
        })
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
