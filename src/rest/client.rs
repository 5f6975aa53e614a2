use std::{fmt, sync::Arc, time::Duration};

use reqwest::cookie::{CookieStore, Jar};
use url::Url;

use super::{
    capture::ClientContext,
    error::{RestError, TransportError},
    request::{RequestBody, RestRequest},
    response::{collect_headers, RestResponse},
};

/// Transport settings shared by every client an ability creates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Sent with every request unless the request sets the same header.
    pub default_headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// An HTTP client bound to one base URL, with its own cookie jar.
pub struct RestClient {
    base_url: Url,
    http: reqwest::Client,
    cookies: Arc<Jar>,
    options: ClientOptions,
}

impl RestClient {
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, RestError> {
        let base_url = Url::parse(base_url).map_err(|source| RestError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            source,
        })?;

        let cookies = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder().cookie_provider(Arc::clone(&cookies));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(agent) = &options.user_agent {
            builder = builder.user_agent(agent.as_str());
        }
        let http = builder.build().map_err(RestError::Client)?;

        Ok(Self {
            base_url,
            http,
            cookies,
            options,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Joins the request's resource onto the base URL and appends its query
    /// parameters. Absolute `http(s)://` resources are used as they are.
    pub fn request_url(&self, request: &RestRequest) -> Result<Url, TransportError> {
        let resource = request.resolved_resource();
        let raw = if resource.starts_with("http://") || resource.starts_with("https://") {
            resource
        } else {
            let base = self.base_url.as_str().trim_end_matches('/');
            match resource.trim_start_matches('/') {
                "" => base.to_string(),
                path => format!("{base}/{path}"),
            }
        };

        let mut url = Url::parse(&raw).map_err(|source| TransportError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if !request.query_params().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query_params());
        }
        Ok(url)
    }

    pub async fn execute(&self, request: &RestRequest) -> Result<RestResponse, TransportError> {
        let url = self.request_url(request)?;
        let mut builder = self.http.request(request.method().clone(), url.clone());

        for (name, value) in &self.options.default_headers {
            let overridden = request
                .headers()
                .iter()
                .any(|(own, _)| own.eq_ignore_ascii_case(name));
            if !overridden {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body() {
            Some(RequestBody::Text(text)) => builder.body(text.clone()),
            Some(RequestBody::Bytes(bytes)) => builder.body(bytes.clone()),
            Some(RequestBody::Json(value)) => builder.json(value),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::from_reqwest(url.as_str(), err))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::from_reqwest(url.as_str(), err))?;

        Ok(RestResponse {
            status,
            url: final_url,
            headers,
            body: body.to_vec(),
        })
    }

    /// Cookies the jar would send to the base URL.
    pub fn cookies(&self) -> Vec<Cookie> {
        let Some(header) = self.cookies.cookies(&self.base_url) else {
            return Vec::new();
        };
        let Ok(header) = header.to_str() else {
            return Vec::new();
        };

        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| Cookie {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect()
    }

    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        self.cookies().into_iter().find(|cookie| cookie.name == name)
    }

    /// Seeds the jar as if the base URL had sent `Set-Cookie: <cookie>`.
    pub fn add_cookie(&self, cookie: &str) {
        self.cookies.add_cookie_str(cookie, &self.base_url);
    }

    pub fn context(&self) -> ClientContext {
        ClientContext {
            base_url: self.base_url.to_string(),
            timeout_ms: self.options.timeout.map(duration_ms),
            connect_timeout_ms: self.options.connect_timeout.map(duration_ms),
            user_agent: self.options.user_agent.clone(),
            default_headers: self.options.default_headers.clone(),
        }
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
