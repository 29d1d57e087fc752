//! Common test utilities

use corvus::config::Settings;

/// Settings with external tools disabled and no credentials configured
pub fn test_settings() -> Settings {
    Settings {
        webhook_url: None,
        shodan_api_key: None,
        gemini_api_key: None,
        google_api_key: None,
        enum_tool_path: "/nonexistent/corvus-test-amass".to_string(),
        docker_path: "/nonexistent/corvus-test-docker".to_string(),
        ..Settings::default()
    }
}

/// Settings pointing the lookup service at a wiremock server
#[allow(dead_code)]
pub fn lookup_settings(mock_uri: &str) -> Settings {
    Settings {
        shodan_api_key: Some("test-key".to_string()),
        lookup_base_url: mock_uri.to_string(),
        ..test_settings()
    }
}

/// Settings pointing the analysis endpoint at a wiremock server
#[allow(dead_code)]
pub fn analysis_settings(mock_uri: &str) -> Settings {
    Settings {
        gemini_api_key: Some("test-key".to_string()),
        google_api_key: Some("test-key".to_string()),
        analysis_url: format!("{mock_uri}/v1beta/models/gemini-pro:generateContent"),
        ..test_settings()
    }
}
