//! REST questions backed by `reqwest`.

mod ability;
mod capture;
mod client;
mod dumper;
mod error;
mod executor;
mod facade;
mod questions;
mod request;
mod response;

pub use ability::CallRestApi;
pub use capture::{
    CaptureRecord, CapturedBody, CapturedRequest, CapturedResponse, ClientContext,
    ExecutionWindow,
};
pub use client::{ClientOptions, Cookie, RestClient};
pub use dumper::{
    normalize_extension, DownloadDumper, FileDownloadDumper, FileRequestDumper, RequestDumper,
};
pub use error::{DumpError, RestError, TransportError};
pub use executor::{execute, Decode, Json, Raw};
pub use facade::Rest;
pub use questions::{CookieValue, Download, Downloaded, RestQuery};
pub use request::{RequestBody, RestRequest};
pub use response::{RestResponse, TypedResponse};
