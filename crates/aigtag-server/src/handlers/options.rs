//! Template listing endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{HeroOption, OptionsResponse};
use crate::ServerState;

/// Lists every registered template as a `{value, label}` pair.
pub async fn list(State(state): State<Arc<ServerState>>) -> Json<OptionsResponse> {
    let options = state
        .templates
        .list_all()
        .map(|t| HeroOption {
            value: t.id.clone(),
            label: t.label.clone(),
        })
        .collect();
    Json(OptionsResponse { options })
}
