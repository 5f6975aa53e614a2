use reqwest::{header::HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RestResponse {
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status).ok()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(reqwest::header::CONTENT_TYPE.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// A response together with its body decoded as `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResponse<T> {
    pub response: RestResponse,
    pub data: T,
}

impl<T> TypedResponse<T> {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

pub(crate) fn collect_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn response(status: u16, body: &str) -> RestResponse {
        RestResponse {
            status,
            url: "http://localhost/widgets".to_string(),
            headers: vec![(
                "content-type".to_string(),
                "application/json; charset=utf-8".to_string(),
            )],
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = response(200, "{}");
        assert_eq!(
            response.header("Content-Type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(response.content_type(), response.header("CONTENT-TYPE"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn success_covers_2xx_only() {
        assert!(response(204, "").is_success());
        assert!(!response(302, "").is_success());
        assert!(!response(500, "").is_success());
        assert_eq!(response(404, "").status_code(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn json_decodes_body() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Widget {
            id: u32,
        }

        let widget: Widget = response(200, r#"{"id":7}"#).json().unwrap();
        assert_eq!(widget, Widget { id: 7 });
        assert!(response(200, "nope").json::<Widget>().is_err());
    }

    #[test]
    fn collect_headers_preserves_values() {
        let mut map = HeaderMap::new();
        map.insert("X-Test", "value".parse().unwrap());
        map.insert("set-cookie", "a=1".parse().unwrap());
        map.append("set-cookie", "b=2".parse().unwrap());

        let headers = collect_headers(&map);
        assert!(headers
            .iter()
            .any(|(name, value)| name == "x-test" && value == "value"));
        assert_eq!(
            headers.iter().filter(|(name, _)| name == "set-cookie").count(),
            2
        );
    }
}
