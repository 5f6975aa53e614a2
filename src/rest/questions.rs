use std::{any::type_name, fmt, marker::PhantomData};

use async_trait::async_trait;

use crate::screenplay::{Actor, Question};

use super::{
    ability::CallRestApi,
    client::Cookie,
    dumper::normalize_extension,
    error::RestError,
    executor::{execute, Decode, Raw},
    request::RestRequest,
};

/// Sends a request and answers with the decoded response.
pub struct RestQuery<D = Raw> {
    base_url: String,
    request: RestRequest,
    decode: PhantomData<fn() -> D>,
}

impl<D> Clone for RestQuery<D> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            request: self.request.clone(),
            decode: PhantomData,
        }
    }
}

impl<D> fmt::Debug for RestQuery<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestQuery")
            .field("base_url", &self.base_url)
            .field("request", &self.request)
            .field("decode", &type_name::<D>())
            .finish()
    }
}

impl<D: Decode> RestQuery<D> {
    pub fn new(base_url: impl Into<String>, request: RestRequest) -> Self {
        Self {
            base_url: base_url.into(),
            request,
            decode: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request(&self) -> &RestRequest {
        &self.request
    }
}

#[async_trait]
impl<D: Decode> Question for RestQuery<D> {
    type Answer = Result<D::Output, RestError>;

    async fn ask(&self, actor: &Actor) -> Self::Answer {
        execute::<D>(actor, &self.base_url, &self.request).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub extension: String,
    /// Where the download dumper stored the file, if one is configured and
    /// the write succeeded.
    pub location: Option<String>,
}

/// Fetches a file. The body is returned as-is whatever the status code.
#[derive(Debug, Clone)]
pub struct Download {
    base_url: String,
    request: RestRequest,
    extension: String,
}

impl Download {
    pub fn new(base_url: impl Into<String>, request: RestRequest, extension: &str) -> Self {
        Self {
            base_url: base_url.into(),
            request,
            extension: normalize_extension(extension),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

#[async_trait]
impl Question for Download {
    type Answer = Result<Downloaded, RestError>;

    async fn ask(&self, actor: &Actor) -> Self::Answer {
        let response = execute::<Raw>(actor, &self.base_url, &self.request).await?;
        let ability = actor.using::<CallRestApi>()?;

        let location = match ability.download_dumper() {
            Some(dumper) => match dumper.dump(&response.body, &self.extension) {
                Ok(location) => {
                    actor
                        .logger()
                        .info(&format!("Downloaded file to: {location}"));
                    Some(location)
                }
                Err(err) => {
                    actor
                        .logger()
                        .warn(&format!("Failed to store download: {err}"));
                    None
                }
            },
            None => {
                actor
                    .logger()
                    .debug("Download dumping is not enabled; the file is only kept in memory");
                None
            }
        };

        Ok(Downloaded {
            status: response.status,
            bytes: response.body,
            extension: self.extension.clone(),
            location,
        })
    }
}

/// Reads a cookie that earlier responses from `base_url` have set.
#[derive(Debug, Clone)]
pub struct CookieValue {
    base_url: String,
    name: String,
}

impl CookieValue {
    pub fn new(base_url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            name: name.into(),
        }
    }
}

#[async_trait]
impl Question for CookieValue {
    type Answer = Result<Option<Cookie>, RestError>;

    async fn ask(&self, actor: &Actor) -> Self::Answer {
        let ability = actor.using::<CallRestApi>()?;
        let client = ability.client(&self.base_url)?;
        Ok(client.cookie(&self.name))
    }
}
