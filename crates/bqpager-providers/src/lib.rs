//! BigQuery collaborators for the pager: credential and project discovery,
//! query submission, job metadata, and a forward-only row source over the
//! `getQueryResults` REST endpoint.

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod source;
pub mod value;

pub use auth::{Credentials, ProjectHint, resolve_credentials_and_project};
pub use client::{BigQueryClient, QueryHandle};
pub use error::{Error, Result};
pub use source::{BigQueryRowSource, ResultPages};
