use serde::de::DeserializeOwned;

use super::{
    executor::{Json, Raw},
    questions::{CookieValue, Download, RestQuery},
    request::RestRequest,
};

/// Entry point for building REST questions.
///
/// ```no_run
/// # async fn demo() -> Result<(), screenplay_rest::RestError> {
/// use screenplay_rest::{Actor, CallRestApi, Rest, RestRequest};
///
/// let actor = Actor::named("Rita").who_can(CallRestApi::new());
/// let response = actor
///     .asks_for(&Rest::request("https://api.example.com", RestRequest::get("/health")))
///     .await?;
/// assert_eq!(response.status, 200);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Rest;

impl Rest {
    pub fn request(base_url: impl Into<String>, request: RestRequest) -> RestQuery<Raw> {
        RestQuery::new(base_url, request)
    }

    pub fn request_as<T>(base_url: impl Into<String>, request: RestRequest) -> RestQuery<Json<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        RestQuery::new(base_url, request)
    }

    pub fn download(
        base_url: impl Into<String>,
        request: RestRequest,
        extension: &str,
    ) -> Download {
        Download::new(base_url, request, extension)
    }

    pub fn cookie(base_url: impl Into<String>, name: impl Into<String>) -> CookieValue {
        CookieValue::new(base_url, name)
    }
}
