//! Catalog service connector
//!
//! Reads the catalog from JSON endpoints:
//!
//! | Call | Endpoint |
//! |------|----------|
//! | `fetch_all_courses` | `GET {base}/courses` |
//! | `fetch_modules` | `GET {base}/courses/{course_id}/modules` |
//! | `fetch_content` | `GET {base}/modules/{module_id}/content` |

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{RemoteError, Result};
use crate::source::RemoteDataSource;
use crate::types::{
    ContentResponse, CourseListResponse, CourseResponse, ModuleListResponse, ModuleResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body echoed into an error message
const MAX_ERROR_BODY: usize = 200;

/// HTTP implementation of [`RemoteDataSource`]
///
/// # Example
///
/// ```ignore
/// use provider_academy::{HttpRemoteDataSource, RemoteDataSource};
///
/// let remote = HttpRemoteDataSource::new(http_client, "https://academy.example.com/api");
/// let courses = remote.fetch_all_courses().await?;
/// ```
pub struct HttpRemoteDataSource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl HttpRemoteDataSource {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        let path: Vec<String> = segments
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.base_url, path.join("/"))
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let request = HttpRequest::get_json(url).timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if !response.is_success() {
            warn!(status = response.status, "Catalog request rejected");
            return Err(RemoteError::Api {
                status_code: response.status,
                message: error_message(&response),
            });
        }

        debug!(status = response.status, bytes = response.body.len(), "Catalog response");
        Ok(serde_json::from_slice(&response.body)?)
    }
}

fn error_message(response: &HttpResponse) -> String {
    let body = String::from_utf8_lossy(&response.body);
    let body = body.trim();
    if body.is_empty() {
        return "empty response body".to_string();
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl RemoteDataSource for HttpRemoteDataSource {
    async fn fetch_all_courses(&self) -> Result<Vec<CourseResponse>> {
        let list: CourseListResponse = self.get(self.endpoint(&["courses"])).await?;
        Ok(list.courses)
    }

    async fn fetch_modules(&self, course_id: &str) -> Result<Vec<ModuleResponse>> {
        let list: ModuleListResponse = self
            .get(self.endpoint(&["courses", course_id, "modules"]))
            .await?;

        Ok(list
            .modules
            .into_iter()
            .map(|module| module.for_course(course_id))
            .collect())
    }

    async fn fetch_content(&self, module_id: &str) -> Result<ContentResponse> {
        let content: ContentResponse = self
            .get(self.endpoint(&["modules", module_id, "content"]))
            .await?;

        Ok(content.for_module(module_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn json_response(status: u16, body: &'static str) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        })
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let remote = HttpRemoteDataSource::new(
            Arc::new(MockHttpClient::new()),
            "https://academy.example.com/api/",
        );

        assert_eq!(remote.base_url(), "https://academy.example.com/api");
        assert_eq!(
            remote.endpoint(&["courses", "a b/c", "modules"]),
            "https://academy.example.com/api/courses/a%20b%2Fc/modules"
        );
    }

    #[tokio::test]
    async fn test_fetch_all_courses() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url == "http://catalog/courses")
            .times(1)
            .returning(|_| {
                json_response(
                    200,
                    r#"{"courses": [{"id": "c1", "title": "Algorithms", "date": "100 Hari"}]}"#,
                )
            });

        let remote = HttpRemoteDataSource::new(Arc::new(mock_http), "http://catalog");
        let courses = remote.fetch_all_courses().await.unwrap();

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, "c1");
        assert_eq!(courses[0].title, "Algorithms");
    }

    #[tokio::test]
    async fn test_fetch_modules_fills_course_id() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url == "http://catalog/courses/c1/modules")
            .times(1)
            .returning(|_| {
                json_response(
                    200,
                    r#"{"modules": [
                        {"moduleId": "m2", "title": "Sorting", "position": 1},
                        {"moduleId": "m1", "title": "Intro", "position": 0}
                    ]}"#,
                )
            });

        let remote = HttpRemoteDataSource::new(Arc::new(mock_http), "http://catalog");
        let modules = remote.fetch_modules("c1").await.unwrap();

        assert_eq!(modules.len(), 2);
        assert!(modules.iter().all(|m| m.course_id == "c1"));
    }

    #[tokio::test]
    async fn test_fetch_content() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| {
                req.url == "http://catalog/modules/m1/content"
                    && req.headers.get("Accept").map(String::as_str) == Some("application/json")
            })
            .times(1)
            .returning(|_| json_response(200, r#"{"content": "<h3>Intro</h3>"}"#));

        let remote = HttpRemoteDataSource::new(Arc::new(mock_http), "http://catalog");
        let content = remote.fetch_content("m1").await.unwrap();

        assert_eq!(content.module_id, "m1");
        assert_eq!(content.content, "<h3>Intro</h3>");
    }

    #[tokio::test]
    async fn test_api_error_handling() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| json_response(503, "catalog under maintenance"));

        let remote = HttpRemoteDataSource::new(Arc::new(mock_http), "http://catalog");
        let result = remote.fetch_all_courses().await;

        match result {
            Err(RemoteError::Api {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 503);
                assert_eq!(message, "catalog under maintenance");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_network_failure() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|_| {
            Err(BridgeError::OperationFailed(
                "Connection failed: refused".to_string(),
            ))
        });

        let remote = HttpRemoteDataSource::new(Arc::new(mock_http), "http://catalog");
        let result = remote.fetch_modules("c1").await;

        assert!(matches!(result, Err(RemoteError::Network(_))));
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| json_response(200, r#"[{"id": "c1"}]"#));

        let remote = HttpRemoteDataSource::new(Arc::new(mock_http), "http://catalog");
        let result = remote.fetch_all_courses().await;

        assert!(matches!(result, Err(RemoteError::Parse(_))));
    }
}
