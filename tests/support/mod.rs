#![allow(dead_code)]

use docvault::{ClientConfig, VaultClient};
use wiremock::MockServer;

pub const TOKEN: &str = "session-abc";
pub const API_VERSION: &str = "v1";

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(&server.uri())
        .expect("valid base url")
        .with_api_version(API_VERSION)
        .with_session_token(TOKEN)
}

pub fn client_for(server: &MockServer) -> VaultClient {
    VaultClient::new(config_for(server)).expect("client")
}

/// Split a `multipart/form-data` body into its parts' header blocks.
pub fn multipart_part_headers(body: &[u8], boundary: &str) -> Vec<String> {
    let text = String::from_utf8_lossy(body);
    let delimiter = format!("--{boundary}");
    text.split(delimiter.as_str())
        .filter(|chunk| {
            let chunk = chunk.trim_start_matches("\r\n");
            !chunk.is_empty() && !chunk.starts_with("--")
        })
        .map(|chunk| {
            let chunk = chunk.trim_start_matches("\r\n");
            chunk
                .split("\r\n\r\n")
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase()
        })
        .collect()
}

pub fn boundary_of(content_type: &str) -> String {
    content_type
        .split(';')
        .find_map(|p| p.trim().strip_prefix("boundary="))
        .map(|b| b.trim_matches('"').to_string())
        .expect("multipart boundary")
}
