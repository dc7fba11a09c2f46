//! Data transfer objects for HTTP message serialization.

use serde::{Deserialize, Serialize};

/// Body of `POST /ask`. Fields are optional so that absence maps to a 400.
#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub user_input: Option<String>,
}

/// Response from `POST /ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub result: String,
}

/// A selectable template in the options list.
#[derive(Debug, Clone, Serialize)]
pub struct HeroOption {
    pub value: String,
    pub label: String,
}

/// Response from `GET /get-hero-options`.
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub options: Vec<HeroOption>,
}

/// Response from `POST /analyze-image`; the model answer parsed as JSON.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub result: serde_json::Value,
}
