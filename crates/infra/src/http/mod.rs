//! HTTP client shared by network-backed event sources

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, RetryPolicy};
