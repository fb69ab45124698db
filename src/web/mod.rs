// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI and JSON API for the monitoring console

pub mod templates;

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use minijinja::{context, Environment};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::alerts::AlertSettings;
use crate::classifier::{render_prompt, ClassificationResult, Classifier, ThreatLevel};
use crate::config::{AppConfig, CameraFeed};
use crate::console::{Console, ConsoleStats, Recorded};
use crate::dispatch::{DispatchOutcome, DISPATCH_ROBOT};
use crate::incidents::Incident;
use crate::reports::{Period, Report, ReportKind};
use crate::roster::{ResponseUnit, UnitStatus};
use crate::{OlhosError, Result};

/// Action labels offered on the incident table
pub const OPERATOR_ACTIONS: &[&str] = &[DISPATCH_ROBOT, "Notify Police", "Send Patrol", "Dismiss"];

/// Shared application state
pub struct AppState {
    pub console: Mutex<Console>,
    pub classifier: Classifier,
    pub config: AppConfig,
    templates: Environment<'static>,
}

impl AppState {
    pub fn new(config: AppConfig, classifier: Classifier) -> Result<Self> {
        Ok(Self {
            console: Mutex::new(Console::new(&config)),
            classifier,
            config,
            templates: templates::environment()?,
        })
    }

    fn console(&self) -> Result<MutexGuard<'_, Console>> {
        self.console.lock().map_err(|_| OlhosError::LockPoisoned)
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>> {
        Ok(Html(self.templates.get_template(name)?.render(ctx)?))
    }

    /// Classify outside the lock, then record under it
    async fn classify(&self, source: &str, prompt: &str) -> Result<ClassifyResponse> {
        if source.trim().is_empty() {
            return Err(OlhosError::InvalidRequest("source must not be empty".to_string()));
        }

        let request_id = Uuid::new_v4();
        let span = info_span!("classify", %request_id, source);

        let result = self.classifier.classify(prompt).instrument(span.clone()).await?;

        let _entered = span.enter();
        let recorded = self.console()?.record_classification(&result, source)?;
        if recorded.is_none() {
            info!("No escalation for {}", source);
        }
        Ok(ClassifyResponse {
            request_id,
            result,
            recorded,
        })
    }
}

impl IntoResponse for OlhosError {
    fn into_response(self) -> Response {
        let status = match &self {
            OlhosError::Adapter(_) => StatusCode::BAD_GATEWAY,
            OlhosError::InvalidIncident(_) | OlhosError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            OlhosError::IncidentNotFound(_) | OlhosError::UnknownUnit(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/classify", post(classify_form))
        .route("/incidents", get(incidents_page))
        .route("/incidents/clear", post(clear_form))
        .route("/incidents/:id/action", post(action_form))
        .route("/roster", get(roster_page))
        .route("/roster/:name/recall", post(recall_form))
        .route("/reports", get(reports_page))
        .route("/settings", get(settings_page).post(settings_form))
        // API endpoints
        .route("/api/incidents", get(api_get_incidents).delete(api_clear_incidents))
        .route("/api/incidents/:id/action", post(api_incident_action))
        .route("/api/classify", post(api_classify))
        .route("/api/roster", get(api_get_roster))
        .route("/api/roster/:name", put(api_set_unit_status))
        .route("/api/roster/:name/recall", post(api_recall_unit))
        .route("/api/reports", get(api_get_report))
        .route("/api/alerts", get(api_get_alerts).put(api_put_alerts))
        .route("/api/cameras", get(api_get_cameras))
        .route("/api/simulate", get(api_simulate))
        .route("/api/stats", get(api_get_stats))
        .route("/api/reset", post(api_reset))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === View models ===

#[derive(Serialize)]
struct IncidentView {
    id: u64,
    description: String,
    level: u8,
    source: String,
    time: String,
    lat: String,
    lon: String,
    status: String,
    pending: bool,
}

impl From<&Incident> for IncidentView {
    fn from(i: &Incident) -> Self {
        Self {
            id: i.id,
            description: i.description.clone(),
            level: i.level.as_u8(),
            source: i.source.clone(),
            time: i.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            lat: format!("{:.4}", i.location.lat),
            lon: format!("{:.4}", i.location.lon),
            status: i.action_status.to_string(),
            pending: i.action_status.is_pending(),
        }
    }
}

#[derive(Serialize)]
struct UnitView {
    name: String,
    battery: u8,
    status: String,
    location: String,
}

impl From<&ResponseUnit> for UnitView {
    fn from(u: &ResponseUnit) -> Self {
        Self {
            name: u.name.clone(),
            battery: u.battery,
            status: u.status.to_string(),
            location: u.location.clone(),
        }
    }
}

fn report_rows(report: &Report) -> Vec<(String, String)> {
    match report {
        Report::DetectionsByPeriod { total, per_day } => {
            let mut rows = vec![("Total".to_string(), total.to_string())];
            rows.extend(per_day.iter().map(|(day, n)| (day.to_string(), n.to_string())));
            rows
        }
        Report::ResponseEfficiency {
            actioned,
            pending,
            mean_seconds_to_action,
            per_action,
        } => {
            let mut rows = vec![
                ("Atendidas".to_string(), actioned.to_string()),
                ("Pendentes".to_string(), pending.to_string()),
                (
                    "Tempo médio até ação".to_string(),
                    mean_seconds_to_action
                        .map(|s| format!("{:.1}s", s))
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ];
            rows.extend(per_action.iter().map(|(label, n)| (label.clone(), n.to_string())));
            rows
        }
        Report::CommonThreatTypes { by_level, by_source } => {
            let mut rows: Vec<_> = by_level
                .iter()
                .map(|(level, n)| (format!("Nível {}", level), n.to_string()))
                .collect();
            rows.extend(by_source.iter().map(|(source, n)| (source.clone(), n.to_string())));
            rows
        }
    }
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    render_index(&state, None)
}

fn render_index(state: &AppState, flash: Option<String>) -> Result<Html<String>> {
    let (stats, pending, roster) = {
        let console = state.console()?;
        let pending: Vec<IncidentView> = console.incidents().list_pending().into_iter().map(IncidentView::from).collect();
        let roster: Vec<UnitView> = console.roster().iter().map(UnitView::from).collect();
        (console.stats(), pending, roster)
    };

    state.render(
        "index.html",
        context! {
            stats => stats,
            incidents => pending,
            roster => roster,
            cameras => state.config.cameras.clone(),
            actions => OPERATOR_ACTIONS,
            flash => flash,
        },
    )
}

#[derive(Deserialize)]
struct ClassifyForm {
    source: String,
    scenario: String,
}

async fn classify_form(State(state): State<Arc<AppState>>, Form(form): Form<ClassifyForm>) -> Result<Html<String>> {
    let camera = state.config.camera_label(&form.source);
    let prompt = render_prompt(&state.config.prompts.threat_assessment, camera, &form.scenario);

    let flash = match state.classify(&form.source, &prompt).await {
        Ok(response) => match response.recorded {
            Some(recorded) => format!(
                "Ocorrência {} registrada (nível {}): {}",
                recorded.incident.id, recorded.incident.level, recorded.incident.description
            ),
            None => format!("Sem escalonamento. Resposta da IA: {}", response.result.summary()),
        },
        Err(e @ (OlhosError::Adapter(_) | OlhosError::InvalidRequest(_))) => format!("Erro na análise: {}", e),
        Err(e) => return Err(e),
    };
    render_index(&state, Some(flash))
}

async fn incidents_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    render_incidents(&state, None)
}

fn render_incidents(state: &AppState, flash: Option<String>) -> Result<Html<String>> {
    let (incidents, reference) = {
        let console = state.console()?;
        let incidents: Vec<IncidentView> = console.incidents().all().iter().map(IncidentView::from).collect();
        (incidents, console.map_reference())
    };
    state.render(
        "incidents.html",
        context! {
            incidents => incidents,
            actions => OPERATOR_ACTIONS,
            reference => format!("{:.4}, {:.4}", reference.lat, reference.lon),
            flash => flash,
        },
    )
}

async fn clear_form(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    state.console()?.clear_incidents();
    Ok(Redirect::to("/incidents"))
}

#[derive(Deserialize)]
struct ActionRequest {
    label: String,
}

async fn action_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Form(form): Form<ActionRequest>,
) -> Result<Html<String>> {
    let outcome = state.console()?.dispatch(id, &form.label);
    render_incidents(&state, Some(outcome.message(id)))
}

async fn roster_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let roster: Vec<UnitView> = state.console()?.roster().iter().map(UnitView::from).collect();
    state.render("roster.html", context! { roster => roster })
}

async fn recall_form(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Result<Redirect> {
    if !state.console()?.recall_unit(&name) {
        return Err(OlhosError::UnknownUnit(name));
    }
    Ok(Redirect::to("/roster"))
}

#[derive(Deserialize)]
struct ReportQuery {
    kind: Option<ReportKind>,
    #[serde(default, deserialize_with = "blank_as_none")]
    from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    to: Option<NaiveDate>,
}

/// Date inputs submit an empty string when left blank
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl ReportQuery {
    fn period(&self) -> Period {
        Period {
            from: self.from,
            to: self.to,
        }
    }
}

async fn reports_page(State(state): State<Arc<AppState>>, Query(query): Query<ReportQuery>) -> Result<Html<String>> {
    let kind = query.kind.unwrap_or(ReportKind::DetectionsByPeriod);
    let report = state.console()?.report(kind, query.period());

    let kinds: Vec<_> = ReportKind::ALL
        .iter()
        .map(|k| context! { value => k, title => k.title() })
        .collect();

    state.render(
        "reports.html",
        context! {
            kinds => kinds,
            selected => kind,
            title => kind.title(),
            rows => report_rows(&report),
            date_from => query.from.map(|d| d.to_string()),
            date_to => query.to.map(|d| d.to_string()),
        },
    )
}

async fn settings_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let alerts = state.console()?.alerts().clone();
    state.render(
        "settings.html",
        context! { alerts => alerts, engine => state.config.ai_engine.clone() },
    )
}

/// HTML checkboxes are only present when ticked
#[derive(Deserialize)]
struct AlertForm {
    email_level1: Option<String>,
    sms_level2: Option<String>,
    auto_dispatch_level3: Option<String>,
    #[serde(default)]
    emails: String,
    #[serde(default)]
    sms_numbers: String,
}

impl From<AlertForm> for AlertSettings {
    fn from(form: AlertForm) -> Self {
        Self {
            email_level1: form.email_level1.is_some(),
            sms_level2: form.sms_level2.is_some(),
            auto_dispatch_level3: form.auto_dispatch_level3.is_some(),
            emails: AlertSettings::parse_list(&form.emails),
            sms_numbers: AlertSettings::parse_list(&form.sms_numbers),
        }
    }
}

async fn settings_form(State(state): State<Arc<AppState>>, Form(form): Form<AlertForm>) -> Result<Redirect> {
    state.console()?.update_alerts(form.into());
    info!("Alert settings saved");
    Ok(Redirect::to("/settings"))
}

// === API Handlers ===

#[derive(Deserialize)]
struct IncidentsQuery {
    #[serde(default)]
    pending: bool,
}

async fn api_get_incidents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IncidentsQuery>,
) -> Result<Json<Vec<Incident>>> {
    let console = state.console()?;
    let incidents = if query.pending {
        console.pending()
    } else {
        console.incidents().all().to_vec()
    };
    Ok(Json(incidents))
}

async fn api_clear_incidents(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.console()?.clear_incidents();
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct ClassifyRequest {
    source: String,
    #[serde(default)]
    scenario: String,
    /// Sent verbatim instead of rendering the prompt template
    prompt: Option<String>,
}

#[derive(Serialize)]
struct ClassifyResponse {
    request_id: Uuid,
    #[serde(flatten)]
    result: ClassificationResult,
    recorded: Option<Recorded>,
}

async fn api_classify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>> {
    let prompt = match request.prompt {
        Some(prompt) => prompt,
        None => {
            let camera = state.config.camera_label(&request.source);
            render_prompt(&state.config.prompts.threat_assessment, camera, &request.scenario)
        }
    };
    Ok(Json(state.classify(&request.source, &prompt).await?))
}

#[derive(Serialize)]
struct ActionResponse {
    #[serde(flatten)]
    outcome: DispatchOutcome,
    message: String,
}

async fn api_incident_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<ActionRequest>,
) -> Result<(StatusCode, Json<ActionResponse>)> {
    let outcome = state.console()?.dispatch(id, &request.label);
    let status = match outcome {
        DispatchOutcome::NotFound => StatusCode::NOT_FOUND,
        DispatchOutcome::NotPending(_) => StatusCode::CONFLICT,
        _ => StatusCode::OK,
    };
    let message = outcome.message(id);
    Ok((status, Json(ActionResponse { outcome, message })))
}

async fn api_get_roster(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ResponseUnit>>> {
    Ok(Json(state.console()?.roster()))
}

#[derive(Deserialize)]
struct UnitStatusRequest {
    status: UnitStatus,
    location: String,
}

async fn api_set_unit_status(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<UnitStatusRequest>,
) -> Result<Json<Vec<ResponseUnit>>> {
    let mut console = state.console()?;
    if !console.set_unit_status(&name, request.status, &request.location) {
        return Err(OlhosError::UnknownUnit(name));
    }
    Ok(Json(console.roster()))
}

async fn api_recall_unit(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ResponseUnit>>> {
    let mut console = state.console()?;
    if !console.recall_unit(&name) {
        return Err(OlhosError::UnknownUnit(name));
    }
    Ok(Json(console.roster()))
}

async fn api_get_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>> {
    let kind = query.kind.unwrap_or(ReportKind::DetectionsByPeriod);
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(OlhosError::InvalidRequest(format!("from {} is after to {}", from, to)));
        }
    }
    Ok(Json(state.console()?.report(kind, query.period())))
}

async fn api_get_alerts(State(state): State<Arc<AppState>>) -> Result<Json<AlertSettings>> {
    Ok(Json(state.console()?.alerts().clone()))
}

async fn api_put_alerts(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<AlertSettings>,
) -> Result<Json<AlertSettings>> {
    let mut console = state.console()?;
    console.update_alerts(settings);
    Ok(Json(console.alerts().clone()))
}

async fn api_get_cameras(State(state): State<Arc<AppState>>) -> Json<Vec<CameraFeed>> {
    Json(state.config.cameras.clone())
}

#[derive(Deserialize)]
struct SimulateQuery {
    level: u8,
}

#[derive(Serialize)]
struct SimulateResponse {
    level: ThreatLevel,
    label: &'static str,
    message: &'static str,
}

async fn api_simulate(Query(query): Query<SimulateQuery>) -> Result<Json<SimulateResponse>> {
    let level = ThreatLevel::try_from(query.level).map_err(OlhosError::InvalidRequest)?;
    Ok(Json(SimulateResponse {
        level,
        label: level.label(),
        message: level.status_message(),
    }))
}

async fn api_get_stats(State(state): State<Arc<AppState>>) -> Result<Json<ConsoleStats>> {
    Ok(Json(state.console()?.stats()))
}

async fn api_reset(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.console()?.reset();
    Ok(StatusCode::NO_CONTENT)
}

/// Start the web server
pub async fn start_server(config: AppConfig, classifier: Classifier) -> Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::new(config, classifier)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| OlhosError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_report_rows_efficiency() {
        let mut per_action = BTreeMap::new();
        per_action.insert("Dismiss".to_string(), 2);
        let rows = report_rows(&Report::ResponseEfficiency {
            actioned: 2,
            pending: 1,
            mean_seconds_to_action: Some(12.34),
            per_action,
        });
        assert!(rows.contains(&("Tempo médio até ação".to_string(), "12.3s".to_string())));
        assert!(rows.contains(&("Dismiss".to_string(), "2".to_string())));
    }

    #[test]
    fn test_alert_form_checkboxes() {
        let form = AlertForm {
            email_level1: None,
            sms_level2: Some("on".to_string()),
            auto_dispatch_level3: Some("on".to_string()),
            emails: "a@b.com".to_string(),
            sms_numbers: String::new(),
        };
        let settings = AlertSettings::from(form);
        assert!(!settings.email_level1);
        assert!(settings.sms_level2);
        assert!(settings.auto_dispatch_level3);
        assert_eq!(settings.emails, vec!["a@b.com".to_string()]);
        assert!(settings.sms_numbers.is_empty());
    }
}
