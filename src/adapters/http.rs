use crate::config::toml_config::ApiSettings;
use crate::domain::model::{
    ListResponse, NamedEntity, PaginationState, Problem, ProblemFilters, ProblemQuery, ServerPage,
};
use crate::domain::ports::{EntityGateway, PageSource};
use crate::utils::error::{AdminError, Result, ServerErrors};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// reqwest-backed client for the admin REST API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();

        for (key, value) in &settings.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                AdminError::ConfigValidationError {
                    field: format!("api.headers.{}", key),
                    message: e.to_string(),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                AdminError::ConfigValidationError {
                    field: format!("api.headers.{}", key),
                    message: e.to_string(),
                }
            })?;
            headers.insert(name, value);
        }

        if let Some(token) = &settings.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                AdminError::ConfigValidationError {
                    field: "api.token".to_string(),
                    message: e.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `segments` are joined with `/` and always end with a trailing slash,
    /// which the API requires.
    fn url(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|s| s.trim_matches('/'))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}/", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!("📡 {} {}", method, url);
        self.client.request(method, url)
    }

    async fn read_json<T: DeserializeOwned>(
        method: &Method,
        url: &str,
        response: Response,
    ) -> Result<T> {
        let status = response.status();
        tracing::debug!("📡 {} {} -> {}", method, url, status);

        if status.is_success() {
            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
        let errors = ServerErrors::from_body(&body);
        tracing::warn!(
            "❌ {} {} failed with {}: {:?}",
            method,
            url,
            status,
            errors.first_message()
        );

        Err(AdminError::ApiStatusError {
            method: method.to_string(),
            path: url.to_string(),
            status: status.as_u16(),
            errors,
        })
    }

    /// `GET /problems/` with pagination and filters.
    pub async fn problems(
        &self,
        state: PaginationState,
        filters: &ProblemFilters,
    ) -> Result<ServerPage<Problem>> {
        let url = self.url(&["problems"]);
        let query = ProblemQuery::new(state, filters);
        let response = self
            .request(Method::GET, &url)
            .query(&query)
            .send()
            .await?;
        Self::read_json(&Method::GET, &url, response).await
    }
}

#[async_trait]
impl PageSource for HttpApi {
    type Row = Problem;
    type Filters = ProblemFilters;

    async fn fetch_page(
        &self,
        state: PaginationState,
        filters: &ProblemFilters,
    ) -> Result<ServerPage<Problem>> {
        self.problems(state, filters).await
    }
}

#[async_trait]
impl EntityGateway for HttpApi {
    async fn search(&self, resource: &str, term: Option<&str>) -> Result<ListResponse<NamedEntity>> {
        let url = self.url(&[resource]);
        let mut request = self.request(Method::GET, &url);
        if let Some(term) = term {
            request = request.query(&[("search", term)]);
        }
        let response = request.send().await?;
        Self::read_json(&Method::GET, &url, response).await
    }

    async fn fetch(&self, resource: &str, id: i64) -> Result<Value> {
        let id = id.to_string();
        let url = self.url(&[resource, &id]);
        let response = self.request(Method::GET, &url).send().await?;
        Self::read_json(&Method::GET, &url, response).await
    }

    async fn create(&self, resource: &str, body: &Value) -> Result<Value> {
        let url = self.url(&[resource]);
        let response = self.request(Method::POST, &url).json(body).send().await?;
        Self::read_json(&Method::POST, &url, response).await
    }

    async fn update(&self, resource: &str, id: i64, body: &Value) -> Result<Value> {
        let id = id.to_string();
        let url = self.url(&[resource, &id]);
        let response = self.request(Method::PATCH, &url).json(body).send().await?;
        Self::read_json(&Method::PATCH, &url, response).await
    }
}
