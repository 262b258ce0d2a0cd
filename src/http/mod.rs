//! Thin HTTP client used for release lookups and archive downloads.

mod client;

pub use client::HttpClient;
