//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per song library endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =========================================================================
    // Server
    // =========================================================================

    pub async fn get_home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// GET /songs with the given raw query parameters
    pub async fn list_songs(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/songs"))
            .query(query)
            .send()
            .await
            .expect("List songs request failed")
    }

    /// GET /songs/lyrics; `extra` carries optional limit/offset
    pub async fn get_lyrics(&self, group: &str, song: &str, extra: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/songs/lyrics"))
            .query(&[("group", group), ("song", song)])
            .query(extra)
            .send()
            .await
            .expect("Get lyrics request failed")
    }

    pub async fn get_info(&self, group: &str, song: &str) -> Response {
        self.client
            .get(self.url("/info"))
            .query(&[("group", group), ("song", song)])
            .send()
            .await
            .expect("Get info request failed")
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn add_song(&self, body: &Value) -> Response {
        self.client
            .post(self.url("/songs"))
            .json(body)
            .send()
            .await
            .expect("Add song request failed")
    }

    pub async fn update_song(&self, body: &Value) -> Response {
        self.client
            .put(self.url("/songs"))
            .json(body)
            .send()
            .await
            .expect("Update song request failed")
    }

    /// DELETE /songs with the key in a JSON body
    pub async fn delete_song(&self, group: &str, song: &str) -> Response {
        self.client
            .delete(self.url("/songs"))
            .json(&serde_json::json!({ "group": group, "song": song }))
            .send()
            .await
            .expect("Delete song request failed")
    }

    /// DELETE /songs with the key in the query string
    pub async fn delete_song_by_query(&self, group: &str, song: &str) -> Response {
        self.client
            .delete(self.url("/songs"))
            .query(&[("group", group), ("song", song)])
            .send()
            .await
            .expect("Delete song request failed")
    }
}
