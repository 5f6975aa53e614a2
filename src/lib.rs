//! REST questions for Screenplay-style test actors.
//!
//! An [`Actor`] granted the [`CallRestApi`] ability can ask questions built
//! with [`Rest`]: plain or JSON-typed requests, file downloads and cookie
//! lookups. Every request can be captured to disk for diagnostics through a
//! [`RequestDumper`].

pub mod config;
pub mod env;
pub mod logging;
pub mod rest;
pub mod screenplay;

pub use logging::{Logger, MemoryLogger, TracingLogger};
pub use rest::{
    CallRestApi, CaptureRecord, ClientOptions, Cookie, CookieValue, Download, Downloaded,
    FileDownloadDumper, FileRequestDumper, RequestDumper, Rest, RestError, RestQuery,
    RestRequest, RestResponse, TransportError, TypedResponse,
};
pub use screenplay::{Ability, AbilityMissing, Actor, Question};
