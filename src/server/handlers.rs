use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use super::AppState;
use crate::core::error::{StoreError, ValidationError};
use crate::core::site::{SiteConfiguration, NAVBAR_LEN};
use crate::store::DocumentStore;

/// Failure of an API request
#[derive(Debug)]
pub(crate) enum ApiError {
    Invalid(ValidationError),
    Store {
        context: &'static str,
        source: StoreError,
        expose: bool,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": e.to_string() })),
            )
                .into_response(),
            ApiError::Store {
                context,
                source,
                expose,
            } => {
                tracing::error!("{}: {}", context, source);
                let body = if expose {
                    json!({ "message": context, "error": source.to_string() })
                } else {
                    json!({ "message": context })
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Run a blocking store call off the async workers
async fn with_store<T, F>(state: &AppState, context: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn DocumentStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .unwrap_or_else(|e| Err(StoreError::Backend(format!("store task failed: {e}"))));
    result.map_err(|source| ApiError::Store {
        context,
        source,
        expose: state.expose_errors,
    })
}

/// Current document, or the synthesized default when none is stored
pub(crate) async fn current_document(state: &AppState) -> Result<SiteConfiguration, ApiError> {
    let stored = with_store(state, "Error fetching component data", |store| {
        store.fetch_latest()
    })
    .await?;
    Ok(stored.map(|s| s.config).unwrap_or_default())
}

pub(crate) async fn get_components_handler(
    State(state): State<AppState>,
) -> Result<Json<SiteConfiguration>, ApiError> {
    Ok(Json(current_document(&state).await?))
}

pub(crate) async fn save_components_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let config = parse_components(&body).map_err(ApiError::Invalid)?;

    let stored = with_store(&state, "Error saving component data", move |store| {
        store.upsert_latest(&config)
    })
    .await?;

    Ok(Json(json!({
        "message": "Component data saved successfully",
        "data": stored.config,
    })))
}

pub(crate) async fn reset_components_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let removed = with_store(&state, "Error resetting component data", |store| {
        store.delete_all()
    })
    .await?;
    tracing::info!("Removed {} stored document(s)", removed);

    Ok(Json(json!({ "message": "All component data reset to defaults" })))
}

pub(crate) async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Backend server is running",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub(crate) async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Dashboard Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /api/health",
            "site": "GET /site",
            "components": {
                "get": "GET /api/components",
                "post": "POST /api/components",
                "delete": "DELETE /api/components",
            },
        },
    }))
}

pub(crate) async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found", "path": uri.path() })),
    )
}

fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

fn non_empty_str(link: &Value, key: &str) -> bool {
    link.get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

/// Check a save request and turn it into a document. All three sections are
/// required; sub-fields missing from `header` and `footer` take defaults.
fn parse_components(body: &[u8]) -> Result<SiteConfiguration, ValidationError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    let sections = ["header", "navbar", "footer"];
    if !sections.iter().all(|key| is_present(value.get(key))) {
        return Err(ValidationError::MissingSections);
    }

    let links = match value.get("navbar") {
        Some(Value::Array(links)) => links,
        _ => return Err(ValidationError::NavbarLength(0)),
    };
    if links.len() != NAVBAR_LEN {
        return Err(ValidationError::NavbarLength(links.len()));
    }
    if let Some(index) = links
        .iter()
        .position(|link| !non_empty_str(link, "label") || !non_empty_str(link, "url"))
    {
        return Err(ValidationError::IncompleteLink { index });
    }

    serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::site::NavLink;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn links(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| json!({ "label": format!("L{i}"), "url": format!("/{i}") }))
                .collect(),
        )
    }

    #[test]
    fn test_null_section_counts_as_missing() {
        let err = parse_components(&body(json!({
            "header": null, "navbar": links(3), "footer": {}
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingSections);
    }

    #[test]
    fn test_length_checked_before_link_contents() {
        let err = parse_components(&body(json!({
            "header": {}, "navbar": [{ "label": "" }], "footer": {}
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::NavbarLength(1));
    }

    #[test]
    fn test_non_string_url_is_incomplete() {
        let mut navbar = links(3);
        navbar[1]["url"] = json!(42);
        let err = parse_components(&body(json!({
            "header": {}, "navbar": navbar, "footer": {}
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::IncompleteLink { index: 1 });
    }

    #[test]
    fn test_wrongly_typed_section_is_malformed() {
        let err = parse_components(&body(json!({
            "header": "title", "navbar": links(3), "footer": {}
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_valid_body() {
        let config = parse_components(&body(json!({
            "header": { "title": "T", "imageUrl": "https://i/x.png" },
            "navbar": links(3),
            "footer": { "email": "e@x.io", "phone": "1", "address": "A" }
        })))
        .unwrap();
        assert_eq!(config.header.image_url, "https://i/x.png");
        assert_eq!(config.navbar[2], NavLink::new("L2", "/2"));
    }
}
