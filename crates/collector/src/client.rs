use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum GithubApiError {
    #[error("github api error: {status} for {endpoint}")]
    Http {
        status: StatusCode,
        endpoint: String,
    },
    #[error("graphql error: {message}")]
    Graphql {
        message: String,
        kind: Option<String>,
    },
}

impl GithubApiError {
    pub fn status(status: StatusCode, endpoint: impl Into<String>) -> Self {
        Self::Http {
            status,
            endpoint: endpoint.into(),
        }
    }
}

/// Transport for GraphQL documents. Implementations return the full response
/// body and fail on transport errors, non-2xx statuses and `errors` payloads.
#[async_trait]
pub trait GraphqlClient: Send + Sync {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value>;
}

pub struct HttpGraphqlClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpGraphqlClient {
    pub fn new(endpoint: &str, user_agent: &str, token: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid GraphQL endpoint {endpoint}"))?;
        let http = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait]
impl GraphqlClient for HttpGraphqlClient {
    #[instrument(skip(self, query, variables), fields(endpoint = %self.endpoint))]
    async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        let payload = json!({
            "query": query,
            "variables": variables,
        });

        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!(
            authenticated = self.token.is_some(),
            "Dispatching GraphQL request"
        );
        let response = request.send().await.context("sending GraphQL request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(GithubApiError::status(status, self.endpoint.path()).into());
        }

        let value: Value = response
            .json()
            .await
            .context("decoding GraphQL response body")?;
        check_graphql_errors(&value)?;
        Ok(value)
    }
}

/// Fails when the response carries a non-empty `errors` list, even alongside `data`.
pub fn check_graphql_errors(value: &Value) -> Result<()> {
    match value.get("errors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => Err(map_graphql_errors(errors)),
        _ => Ok(()),
    }
}

fn map_graphql_errors(errors: &[Value]) -> anyhow::Error {
    if let Some(first) = errors.first() {
        let message = first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown GraphQL error")
            .to_string();
        let kind = first
            .get("type")
            .or_else(|| first.get("extensions").and_then(|ext| ext.get("code")))
            .and_then(Value::as_str)
            .map(str::to_string);
        return GithubApiError::Graphql { message, kind }.into();
    }
    anyhow!("unknown GraphQL error")
}
