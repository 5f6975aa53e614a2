use std::{
    collections::HashMap,
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{config::RestSettings, screenplay::Ability};

use super::{
    client::{ClientOptions, RestClient},
    dumper::{DownloadDumper, FileDownloadDumper, FileRequestDumper, RequestDumper},
    error::RestError,
};

/// Lets an actor call REST APIs.
///
/// Clients are created lazily, one per base URL, and reused for later calls
/// so that cookies persist between requests to the same API.
pub struct CallRestApi {
    options: ClientOptions,
    clients: Mutex<HashMap<String, Arc<RestClient>>>,
    request_dumper: Option<Arc<dyn RequestDumper>>,
    download_dumper: Option<Arc<dyn DownloadDumper>>,
}

impl CallRestApi {
    pub fn new() -> Self {
        Self::with_options(ClientOptions::default())
    }

    pub fn with_options(options: ClientOptions) -> Self {
        Self {
            options,
            clients: Mutex::new(HashMap::new()),
            request_dumper: None,
            download_dumper: None,
        }
    }

    /// Client options and dump directories taken from resolved settings.
    pub fn from_settings(settings: &RestSettings) -> Self {
        let mut ability = Self::with_options(settings.client_options.clone());
        if let Some(dir) = &settings.dump_dir {
            ability = ability.dumping_requests_to(dir.clone());
        }
        if let Some(dir) = &settings.download_dir {
            ability = ability.dumping_downloads_to(dir.clone());
        }
        ability
    }

    pub fn dumping_requests_to(self, dir: impl Into<PathBuf>) -> Self {
        self.with_request_dumper(FileRequestDumper::new(dir))
    }

    pub fn with_request_dumper(mut self, dumper: impl RequestDumper + 'static) -> Self {
        self.request_dumper = Some(Arc::new(dumper));
        self
    }

    pub fn dumping_downloads_to(self, dir: impl Into<PathBuf>) -> Self {
        self.with_download_dumper(FileDownloadDumper::new(dir))
    }

    pub fn with_download_dumper(mut self, dumper: impl DownloadDumper + 'static) -> Self {
        self.download_dumper = Some(Arc::new(dumper));
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn can_dump_requests(&self) -> bool {
        self.request_dumper.is_some()
    }

    pub fn request_dumper(&self) -> Option<&dyn RequestDumper> {
        self.request_dumper.as_deref()
    }

    pub fn can_dump_downloads(&self) -> bool {
        self.download_dumper.is_some()
    }

    pub fn download_dumper(&self) -> Option<&dyn DownloadDumper> {
        self.download_dumper.as_deref()
    }

    /// The client for `base_url`, building it on first use.
    pub fn client(&self, base_url: &str) -> Result<Arc<RestClient>, RestError> {
        let key = base_url.trim_end_matches('/').to_string();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&key) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(RestClient::new(base_url, self.options.clone())?);
        clients.insert(key, Arc::clone(&client));
        Ok(client)
    }
}

impl Default for CallRestApi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ability for CallRestApi {}

impl fmt::Debug for CallRestApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clients = self
            .clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("CallRestApi")
            .field("options", &self.options)
            .field("clients", &clients)
            .field("dumps_requests", &self.can_dump_requests())
            .field("dumps_downloads", &self.can_dump_downloads())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clients_are_cached_per_base_url() {
        let ability = CallRestApi::new();

        let first = ability.client("http://localhost:3000").unwrap();
        let again = ability.client("http://localhost:3000/").unwrap();
        let other = ability.client("http://localhost:4000").unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn invalid_base_url_is_not_cached() {
        let ability = CallRestApi::new();
        assert!(matches!(
            ability.client("not a url"),
            Err(RestError::InvalidBaseUrl { .. })
        ));
        assert!(format!("{ability:?}").contains("clients: 0"));
    }

    #[test]
    fn dumping_is_opt_in() {
        let ability = CallRestApi::new();
        assert!(!ability.can_dump_requests());
        assert!(!ability.can_dump_downloads());

        let ability = ability
            .dumping_requests_to("target/dumps")
            .dumping_downloads_to("target/downloads");
        assert!(ability.can_dump_requests());
        assert!(ability.can_dump_downloads());
    }

    #[test]
    fn clients_inherit_options() {
        let ability = CallRestApi::with_options(ClientOptions {
            timeout: Some(Duration::from_millis(250)),
            ..ClientOptions::default()
        });
        let client = ability.client("http://localhost:3000").unwrap();
        assert_eq!(client.options().timeout, Some(Duration::from_millis(250)));
    }
}
