//! HTTP plumbing shared by the REST backend and the API client.

mod client;

pub use client::{HttpClient, HttpClientBuilder};
