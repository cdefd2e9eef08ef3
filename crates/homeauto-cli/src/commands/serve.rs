//! Serve command implementation
//!
//! Serves the recommendation form with:
//! - `GET /` and `POST /` for the HTML form and its results panel
//! - `POST /api/recommend` for JSON clients
//! - `GET /health`
//!
//! The model bundle is loaded once before the listener binds and shared
//! with every handler through an `Arc<AppState>`.

use crate::error::{CliError, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use colored::Colorize;
use homeauto::form::{normalize, FlowState, FormConfig, FormInput, FormMode, RecommendationFlow, Toggle};
use homeauto::recommend::{Recommender, BUNDLE_FORMAT_VERSION};
use homeauto::vocab::{Condition, Mood, TimeOfDay};
use minijinja::{context, Environment};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Server configuration
#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Host to bind to
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl ServerConfig {
    pub(crate) fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub(crate) fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Get bind address
    pub(crate) fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Everything a handler needs; read-only after start-up.
pub(crate) struct AppState {
    recommender: Recommender,
    form: FormConfig,
    templates: Environment<'static>,
}

impl AppState {
    pub(crate) fn new(recommender: Recommender, form: FormConfig) -> Result<Self> {
        let mut templates = Environment::new();
        templates
            .add_template("index.html", INDEX_TEMPLATE)
            .map_err(|e| CliError::Server(format!("invalid page template: {e}")))?;
        Ok(Self {
            recommender,
            form,
            templates,
        })
    }

    fn render(&self, page: &Page) -> Response {
        let clock = self
            .form
            .show_clock
            .then(|| chrono::Local::now().format("%A, %B %-d, %Y %H:%M").to_string());
        let moods: Vec<&str> = Mood::ALL.iter().map(|m| m.as_str()).collect();
        let conditions: Vec<&str> = Condition::ALL.iter().map(|c| c.as_str()).collect();
        let times: Vec<&str> = TimeOfDay::ALL.iter().map(|t| t.as_str()).collect();

        let rendered = self.templates.get_template("index.html").and_then(|t| {
            t.render(context! {
                clock,
                custom_mode => self.form.custom_mode,
                moods,
                conditions,
                times,
                mode => page.mode,
                actions => page.actions,
                substitutions => page.substitutions,
                error => page.error,
            })
        });
        match rendered {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to render page");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
            }
        }
    }
}

/// Values for one rendering of the form page.
#[derive(Debug, Default)]
struct Page {
    mode: &'static str,
    actions: Vec<String>,
    substitutions: Vec<String>,
    error: Option<String>,
}

/// The urlencoded body of either form tab.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FormFields {
    mode: String,
    mood: String,
    person_condition: String,
    time_of_day: String,
    at_home: String,
    at_home_custom: Option<String>,
    is_holiday: String,
    is_holiday_custom: Option<String>,
}

impl FormFields {
    fn into_input(self) -> FormInput {
        FormInput {
            mode: if self.mode == "custom" {
                FormMode::Custom
            } else {
                FormMode::Standard
            },
            mood: self.mood.trim().to_string(),
            person_condition: self.person_condition.trim().to_string(),
            time_of_day: self.time_of_day.trim().to_string(),
            at_home: Toggle::from_form(&self.at_home, self.at_home_custom.as_deref()),
            is_holiday: Toggle::from_form(&self.is_holiday, self.is_holiday_custom.as_deref()),
        }
    }
}

/// JSON body for `POST /api/recommend`.
#[derive(Debug, Deserialize)]
pub(crate) struct RecommendRequest {
    mood: String,
    person_condition: String,
    time_of_day: String,
    #[serde(default = "default_at_home")]
    at_home: u8,
    #[serde(default)]
    is_holiday: u8,
    /// Map unknown text to fallback values
    #[serde(default)]
    custom: bool,
}

fn default_at_home() -> u8 {
    1
}

fn flag_toggle(flag: u8) -> Toggle {
    match flag {
        1 => Toggle::Yes,
        0 => Toggle::No,
        other => Toggle::Custom(other.to_string()),
    }
}

impl RecommendRequest {
    fn into_input(self) -> FormInput {
        let mode = if self.custom {
            FormMode::Custom
        } else {
            FormMode::Standard
        };
        FormInput {
            mode,
            mood: self.mood,
            person_condition: self.person_condition,
            time_of_day: self.time_of_day,
            at_home: flag_toggle(self.at_home),
            is_holiday: flag_toggle(self.is_holiday),
        }
    }
}

fn substitution_notes(input: &FormInput, config: &FormConfig) -> Vec<String> {
    normalize(input, config)
        .map(|n| {
            n.substitutions
                .into_iter()
                .map(|(column, text)| format!("{column}: \"{text}\" was mapped to a known value"))
                .collect()
        })
        .unwrap_or_default()
}

async fn index(State(state): State<Arc<AppState>>) -> Response {
    state.render(&Page::default())
}

async fn submit(State(state): State<Arc<AppState>>, Form(fields): Form<FormFields>) -> Response {
    let input = fields.into_input();
    let mut flow = RecommendationFlow::new(&state.recommender, &state.form);
    let mode = match input.mode {
        FormMode::Standard => "standard",
        FormMode::Custom => "custom",
    };
    let page = match flow.submit(&input) {
        FlowState::Displaying(actions) => Page {
            mode,
            actions: actions.clone(),
            substitutions: substitution_notes(&input, &state.form),
            error: None,
        },
        FlowState::Failed(message) => Page {
            mode,
            error: Some(message.clone()),
            ..Page::default()
        },
        FlowState::Collecting => Page::default(),
    };
    state.render(&page)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "bundle_version": BUNDLE_FORMAT_VERSION,
        "music_genres": state.recommender.bundle().music_genres(),
        "custom_mode": state.form.custom_mode,
    }))
}

async fn api_recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendRequest>,
) -> Response {
    let input = request.into_input();
    let mut flow = RecommendationFlow::new(&state.recommender, &state.form);
    match flow.submit(&input) {
        FlowState::Displaying(actions) => {
            Json(serde_json::json!({ "actions": actions })).into_response()
        }
        FlowState::Failed(message) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        FlowState::Collecting => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Build the axum Router for the form and API endpoints.
pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/health", get(health))
        .route("/api/recommend", post(api_recommend))
        .with_state(state)
}

fn print_banner(bind_addr: &str, form: &FormConfig) {
    println!();
    println!(
        "{}",
        format!("Smart Home server listening on http://{bind_addr}")
            .green()
            .bold()
    );
    println!();
    println!("{}", "Endpoints:".cyan());
    println!("  GET  /               - Recommendation form");
    println!("  POST /               - Submit the form");
    println!("  POST /api/recommend  - JSON recommendations");
    println!("  GET  /health         - Health check");
    println!();
    println!(
        "{}",
        format!(
            "Custom mode: {} | Clock: {} | Validation: {}",
            form.custom_mode, form.show_clock, form.validate_before_predict
        )
        .dimmed()
    );
    println!("{}", "Press Ctrl+C to stop".dimmed());
}

/// Loads the bundle and serves until Ctrl+C. A load failure ends the
/// command before anything binds.
pub(crate) fn run(model: &Path, config: &ServerConfig, form: FormConfig) -> Result<()> {
    super::require_file(model)?;
    println!("{}", "Loading model bundle...".dimmed());
    let recommender =
        Recommender::load(model).map_err(|e| CliError::ModelLoadFailed(e.to_string()))?;
    println!("{}", "Model loaded successfully".green());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Server(format!("Failed to create runtime: {e}")))?;

    let bind_addr = config.bind_addr();
    let state = Arc::new(AppState::new(recommender, form.clone())?);

    runtime.block_on(async move {
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind: {e}")))?;

        print_banner(&bind_addr, &form);
        tracing::info!(addr = %bind_addr, "server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CliError::Server(format!("Server error: {e}")))?;

        println!();
        println!("{}", "Server stopped".yellow());
        Ok(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use homeauto::recommend::ModelBundle;
    use homeauto::tree::ForestConfig;
    use tower::ServiceExt;

    fn state(form: FormConfig) -> Arc<AppState> {
        let ds = homeauto::synthetic::generate(300, 17);
        let bundle = ModelBundle::train(&ds, &ForestConfig::default().with_n_estimators(5)).unwrap();
        Arc::new(AppState::new(Recommender::from_bundle(bundle), form).unwrap())
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_post(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/recommend")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_server_config_builders() {
        let config = ServerConfig::default().with_host("0.0.0.0").with_port(3000);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_run_missing_model_fails_before_binding() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(
            &dir.path().join("models.bin"),
            &ServerConfig::default(),
            FormConfig::default(),
        );
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }

    #[test]
    fn test_run_corrupt_model_is_fatal() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a bundle").unwrap();
        let result = run(file.path(), &ServerConfig::default(), FormConfig::default());
        assert!(matches!(result, Err(CliError::ModelLoadFailed(_))));
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state(FormConfig::default()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["bundle_version"], BUNDLE_FORMAT_VERSION);
    }

    #[tokio::test]
    async fn test_index_renders_both_tabs() {
        let app = build_router(state(FormConfig::default()));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Standard Input Parameters"));
        assert!(html.contains("Custom Testing Mode"));
        assert!(html.contains("getting_ready"));
    }

    #[tokio::test]
    async fn test_index_without_custom_mode() {
        let app = build_router(state(FormConfig::default().with_custom_mode(false)));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(!body_text(response).await.contains("Custom Testing Mode"));
    }

    #[tokio::test]
    async fn test_standard_submit_lists_actions() {
        let app = build_router(state(FormConfig::default()));
        let response = app
            .oneshot(form_post(
                "mode=standard&mood=happy&person_condition=at_home&time_of_day=evening&at_home=Yes&is_holiday=No",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Here are your recommended actions:"));
        assert!(html.contains("<li>"));
    }

    #[tokio::test]
    async fn test_custom_submit_uses_fallback() {
        let app = build_router(state(FormConfig::default()));
        let response = app
            .oneshot(form_post(
                "mode=custom&mood=zzz-unknown&person_condition=at_home&time_of_day=evening&at_home=Custom&at_home_custom=maybe&is_holiday=No",
            ))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("recommended actions for the custom scenario"));
        assert!(html.contains("was mapped to a known value"));
    }

    #[tokio::test]
    async fn test_standard_submit_shows_error() {
        let app = build_router(state(FormConfig::default()));
        let response = app
            .oneshot(form_post(
                "mode=standard&mood=grumpy&person_condition=at_home&time_of_day=evening&at_home=Yes&is_holiday=No",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Invalid input"));
        assert!(!html.contains("<li>"));
    }

    #[tokio::test]
    async fn test_api_recommend() {
        let app = build_router(state(FormConfig::default().with_validation(true)));
        let response = app
            .oneshot(json_post(serde_json::json!({
                "mood": "happy",
                "person_condition": "at_home",
                "time_of_day": "evening",
                "at_home": 1,
                "is_holiday": 0
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value["actions"].as_array().map(Vec::len), Some(10));
    }

    #[tokio::test]
    async fn test_api_rejects_unknown_mood() {
        let app = build_router(state(FormConfig::default()));
        let response = app
            .oneshot(json_post(serde_json::json!({
                "mood": "grumpy",
                "person_condition": "at_home",
                "time_of_day": "evening"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(value["error"].as_str().unwrap().contains("grumpy"));
    }
}
