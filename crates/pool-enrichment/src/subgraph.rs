//! A minimal GraphQL client for subgraph endpoints.

use {
    anyhow::{Context, Result},
    reqwest::{Client, Url},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::{Map, Value},
    thiserror::Error,
};

/// A general client for querying a subgraph.
pub struct SubgraphClient {
    client: Client,
    subgraph_url: Url,
}

/// Errors reported by the subgraph itself, as opposed to transport errors.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("{0}")]
    GraphQl(String),
    #[error("invalid GraphQL response")]
    InvalidResponse,
}

impl SubgraphClient {
    pub fn try_new(subgraph_url: Url, client: Client) -> Result<Self> {
        anyhow::ensure!(
            matches!(subgraph_url.scheme(), "http" | "https"),
            "unsupported subgraph URL scheme {}",
            subgraph_url.scheme()
        );
        Ok(Self {
            client,
            subgraph_url,
        })
    }

    /// Performs the specified GraphQL query on the subgraph.
    pub async fn query<T>(&self, query: &str, variables: Option<Map<String, Value>>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.subgraph_url.clone())
            .json(&Query { query, variables })
            .send()
            .await
            .context("subgraph request failed")?
            .error_for_status()?
            .json::<QueryResponse<T>>()
            .await
            .context("invalid subgraph response body")?;
        Ok(response.into_result()?)
    }
}

#[derive(Serialize)]
struct Query<'a> {
    query: &'a str,
    variables: Option<Map<String, Value>>,
}

/// Subgraphs can answer with data, errors or (in theory) both.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    #[serde(default = "none")]
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> QueryResponse<T> {
    fn into_result(self) -> Result<T, QueryError> {
        let mut errors = self.errors.unwrap_or_default().into_iter();
        match (self.data, errors.next()) {
            (Some(data), None) => Ok(data),
            (None, Some(first)) => {
                // Only the first error is returned, log the rest.
                for error in errors {
                    tracing::warn!(message = %error.message, "additional GraphQL error");
                }
                Err(QueryError::GraphQl(first.message))
            }
            _ => Err(QueryError::InvalidResponse),
        }
    }
}

/// `#[serde(default)]` on an `Option<T>` would require `T: Default`.
fn none<T>() -> Option<T> {
    None
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn response<T: DeserializeOwned>(value: Value) -> Result<T, QueryError> {
        serde_json::from_value::<QueryResponse<T>>(value)
            .unwrap()
            .into_result()
    }

    #[test]
    fn serialize_query() {
        assert_eq!(
            serde_json::to_value(Query {
                query: "{ pools { id } }",
                variables: Some(json_map! {
                    "addresses" => vec!["0x01"],
                    "threshold" => -1,
                }),
            })
            .unwrap(),
            json!({
                "query": "{ pools { id } }",
                "variables": {
                    "addresses": ["0x01"],
                    "threshold": -1,
                },
            }),
        );
    }

    #[test]
    fn successful_response() {
        assert_eq!(response::<u64>(json!({ "data": 42 })), Ok(42));
    }

    #[test]
    fn error_responses_surface_the_first_error() {
        assert_eq!(
            response::<u64>(json!({
                "data": null,
                "errors": [{ "message": "foo" }, { "message": "bar" }],
            })),
            Err(QueryError::GraphQl("foo".to_string()))
        );
        assert_eq!(
            response::<u64>(json!({ "errors": [{ "message": "bar" }] }))
                .unwrap_err()
                .to_string(),
            "bar"
        );
    }

    #[test]
    fn invalid_responses() {
        for value in [
            json!({ "data": null }),
            json!({ "data": null, "errors": [] }),
            json!({ "data": null, "errors": null }),
            json!({ "data": 1, "errors": [{ "message": "partial" }] }),
        ] {
            assert_eq!(response::<u64>(value), Err(QueryError::InvalidResponse));
        }
    }

    #[test]
    fn rejects_non_http_urls() {
        let url = Url::parse("ftp://example.com/subgraph").unwrap();
        assert!(SubgraphClient::try_new(url, Client::new()).is_err());
    }
}
