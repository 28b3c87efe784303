//! Mock server helpers for feed and gallery testing
//!
//! Provides utilities for setting up wiremock mock servers that publish
//! feed documents, gallery indexes and package payloads.

#![allow(dead_code)]

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the feed is published at
pub const FEED_PATH: &str = "/extensions.json";

/// Path the gallery index is published at
pub const GALLERY_INDEX_PATH: &str = "/gallery/index.json";

/// Serve `body` at `/extensions.json`
pub async fn mock_feed(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve `first` for the first request and `then` afterwards
pub async fn mock_feed_sequence(server: &MockServer, first: &str, then: &str) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(first))
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(then))
        .mount(server)
        .await;
}

/// Answer feed requests with `status`
pub async fn mock_failing_feed(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve a gallery index document
pub async fn mock_gallery_index(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(GALLERY_INDEX_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve a package payload at `package_path`
pub async fn mock_package(server: &MockServer, package_path: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(package_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

/// Feed URL on the mock server
pub fn feed_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), FEED_PATH)
}

/// Gallery index URL on the mock server
pub fn gallery_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), GALLERY_INDEX_PATH)
}
