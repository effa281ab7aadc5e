//! Header builders for Plantbook API requests.

/// Build the `Authorization: Bearer` header.
pub fn bearer(access_token: &str) -> (String, String) {
    ("Authorization".to_string(), format!("Bearer {}", access_token))
}

/// Headers sent with every authorized API request.
pub fn api_headers(access_token: &str) -> Vec<(String, String)> {
    vec![
        bearer(access_token),
        ("Accept".to_string(), "application/json".to_string()),
    ]
}
