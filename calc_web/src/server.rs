use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use calc_core::calculations::form::{bind, prepare_forms, BoundForm, FormState};
use calc_core::records::{CalculationRecord, RecordFile};
use calc_core::shaft::editor::{HiddenField, TextField};
use calc_core::shaft::summary::Summary;
use calc_core::shaft::table::TableRow;
use calc_core::shaft::{EditorAction, Segment};
use calc_core::{append_record, load_records, CalcError, CalculatorKind, ShaftEditor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::assets::handle_static;
use crate::config::{WebSettings, LOCK_OWNER};
use crate::pages::{self, SaveNotice};
use crate::shaft_form;

/// Form field of the "save this result" checkbox.
const SAVE_FIELD: &str = "save";

#[derive(Clone)]
struct AppState {
    settings: Arc<WebSettings>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    error: CalcError,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShaftPreviewRequest {
    /// Hidden-field text, or the segment array itself
    #[serde(default)]
    geometry: Value,

    /// Actions replayed in order after seeding
    #[serde(default)]
    actions: Vec<EditorAction>,
}

#[derive(Debug, Serialize)]
struct ShaftPreviewBody {
    geometry: String,
    segments: Vec<Segment>,
    rows: Vec<TableRow>,
    summary: Summary,
    summary_text: String,
    svg: String,
    /// Whether each requested action changed the geometry
    applied: Vec<bool>,
}

/// Build the application router.
pub fn router(settings: WebSettings) -> Router {
    let state = AppState {
        settings: Arc::new(settings),
    };

    Router::new()
        .route("/", get(handle_home).post(handle_home_submit))
        .route(
            "/calculator/:slug",
            get(handle_calculator).post(handle_calculator_submit),
        )
        .route("/shaft", get(handle_shaft).post(handle_shaft_submit))
        .route("/saved-results", get(handle_saved_results))
        .route("/api/calculate/:slug", post(handle_api_calculate))
        .route("/api/shaft/preview", post(handle_api_shaft_preview))
        .route("/static/*path", get(handle_static))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Bind `settings.bind` and serve until the process exits.
pub async fn run_http_server(settings: WebSettings) -> Result<()> {
    let bind = settings.bind.clone();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind HTTP server to `{bind}`"))?;
    serve(listener, settings).await
}

/// Serve on an already bound listener.
pub async fn serve(listener: TcpListener, settings: WebSettings) -> Result<()> {
    let local_addr = listener.local_addr().ok();

    info!(
        requested_bind = %settings.bind,
        bound_addr = local_addr.map(|addr| addr.to_string()),
        records_path = %settings.records_path.display(),
        max_saved_results = settings.max_saved_results,
        "starting HTTP server"
    );

    axum::serve(listener, router(settings))
        .await
        .context("HTTP server exited with an error")
}

async fn handle_health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn handle_home() -> Html<String> {
    Html(pages::home_page(&prepare_forms(None), None))
}

async fn handle_home_submit(
    State(state): State<AppState>,
    Form(data): Form<HashMap<String, String>>,
) -> Html<String> {
    let prepared = prepare_forms(Some(&data));
    match prepared.bound() {
        Some(form) => debug!(
            calculator = %form.kind,
            valid = form.is_valid(),
            "calculator form submitted"
        ),
        None => debug!("form submitted without a known calculator"),
    }

    let notice = match prepared.bound() {
        Some(form) => save_if_requested(&state, &data, form).await,
        None => None,
    };
    Html(pages::home_page(&prepared, notice.as_ref()))
}

async fn handle_calculator(Path(slug): Path<String>) -> Response {
    match CalculatorKind::parse(&slug) {
        Ok(kind) => Html(pages::calculator_page(&FormState::Unbound(kind), None)).into_response(),
        Err(error) => error_page(&error),
    }
}

async fn handle_calculator_submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(data): Form<HashMap<String, String>>,
) -> Response {
    let kind = match CalculatorKind::parse(&slug) {
        Ok(kind) => kind,
        Err(error) => return error_page(&error),
    };

    let form = bind(kind, &data);
    debug!(calculator = %kind, valid = form.is_valid(), "calculator form submitted");
    let notice = save_if_requested(&state, &data, &form).await;

    Html(pages::calculator_page(&FormState::Bound(form), notice.as_ref())).into_response()
}

/// Persist a valid result when the save checkbox was ticked.
async fn save_if_requested(
    state: &AppState,
    data: &HashMap<String, String>,
    form: &BoundForm,
) -> Option<SaveNotice> {
    if !data.contains_key(SAVE_FIELD) {
        return None;
    }
    let (Some(cleaned), Some(result)) = (&form.cleaned, &form.result) else {
        return None;
    };

    let record = CalculationRecord::new(form.kind, cleaned.clone(), result.clone());
    match save_record(state, record).await {
        Ok(total) => {
            info!(calculator = %form.kind, total, "saved calculation result");
            Some(SaveNotice::Saved)
        }
        Err(error) => {
            warn!(calculator = %form.kind, error = %error, "failed to save calculation result");
            Some(SaveNotice::Failed(error.to_string()))
        }
    }
}

async fn save_record(state: &AppState, record: CalculationRecord) -> Result<usize, CalcError> {
    let path = state.settings.records_path.clone();
    let max_records = state.settings.max_saved_results;

    tokio::task::spawn_blocking(move || append_record(&path, record, max_records, LOCK_OWNER))
        .await
        .map_err(|e| CalcError::Internal {
            message: format!("save task failed: {e}"),
        })?
        .map(|file| file.len())
}

async fn load_saved(state: &AppState) -> Result<RecordFile, CalcError> {
    let path = state.settings.records_path.clone();

    tokio::task::spawn_blocking(move || load_records(&path))
        .await
        .map_err(|e| CalcError::Internal {
            message: format!("load task failed: {e}"),
        })?
}

async fn handle_saved_results(State(state): State<AppState>) -> Response {
    match load_saved(&state).await {
        Ok(file) => Html(pages::saved_results_page(&file)).into_response(),
        Err(error) => {
            warn!(error = %error, "failed to load saved results");
            error_page(&error)
        }
    }
}

async fn handle_shaft(Query(query): Query<HashMap<String, String>>) -> Html<String> {
    Html(pages::shaft_page(&shaft_form::initial_page(&query)))
}

async fn handle_shaft_submit(Form(data): Form<HashMap<String, String>>) -> Html<String> {
    Html(pages::shaft_page(&shaft_form::handle_post(data)))
}

async fn handle_api_calculate(Path(slug): Path<String>, Json(input): Json<Value>) -> Response {
    let result = CalculatorKind::parse(&slug).and_then(|kind| kind.calculate_json(&input));
    match result {
        Ok(result) => {
            debug!(calculator = %slug, value = result.value, "API calculation");
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(error) => error_json(error),
    }
}

async fn handle_api_shaft_preview(Json(req): Json<ShaftPreviewRequest>) -> Json<ShaftPreviewBody> {
    let mut editor = ShaftEditor::new(TextField::new("geometry", geometry_text(&req.geometry)));
    let applied = req.actions.iter().map(|action| editor.apply(action)).collect();

    Json(ShaftPreviewBody {
        geometry: editor.field().value().to_string(),
        segments: editor.segments().to_vec(),
        rows: editor.rows().to_vec(),
        summary: editor.summary(),
        summary_text: editor.summary_text(),
        svg: editor.preview_svg(),
        applied,
    })
}

/// Accept the geometry either as hidden-field text or as the array itself.
fn geometry_text(geometry: &Value) -> String {
    match geometry {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn status_code_for_error(error: &CalcError) -> StatusCode {
    match error {
        CalcError::UnknownCalculator { .. } => StatusCode::NOT_FOUND,
        error if error.is_client_error() => StatusCode::BAD_REQUEST,
        CalcError::FileLocked { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_json(error: CalcError) -> Response {
    // The API only deserializes the request body.
    let status = match error {
        CalcError::SerializationError { .. } => StatusCode::BAD_REQUEST,
        ref error => status_code_for_error(error),
    };
    warn!(status = status.as_u16(), error = %error, "API request failed");
    let body = ErrorBody {
        code: error.error_code(),
        message: error.to_string(),
        error,
    };
    (status, Json(body)).into_response()
}

fn error_page(error: &CalcError) -> Response {
    let status = status_code_for_error(error);
    let title = status.canonical_reason().unwrap_or("Error");
    (status, Html(pages::error_page(title, &error.to_string()))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_code_for_error(&CalcError::unknown_calculator("gearbox")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_code_for_error(&CalcError::invalid_input("power", "-1", "negative")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code_for_error(&CalcError::missing_field("power")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code_for_error(&CalcError::serialization("Invalid JSON in r.json")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_code_for_error(&CalcError::file_locked("r.json", "calc_web", "now")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_code_for_error(&CalcError::file_error("read", "r.json", "denied")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_body_errors_are_bad_requests() {
        let response = error_json(CalcError::serialization("missing field `power`"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_json(CalcError::file_locked("r.json", "calc_web", "now"));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_geometry_text() {
        assert_eq!(geometry_text(&Value::Null), "");
        assert_eq!(geometry_text(&json!("[]")), "[]");
        assert_eq!(
            geometry_text(&json!([{ "length_mm": 1 }])),
            r#"[{"length_mm":1}]"#
        );
    }
}
