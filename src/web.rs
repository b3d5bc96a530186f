use std::sync::{Mutex, MutexGuard};

use actix_files::Files;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::form::{write_board_csv, write_roster_csv, ApplicantForm};
use crate::parser::read_applicants;
use crate::roster::Applicant;
use crate::schedule::{DragPayload, DropTarget, SlotLabel};
use crate::store::{Confirmation, Outcome, ScheduleStore, Snapshot};

pub struct AppState {
    pub store: Mutex<ScheduleStore>,
    pub admin_password: String,
}

impl AppState {
    pub fn new(store: ScheduleStore, admin_password: impl Into<String>) -> Self {
        AppState {
            store: Mutex::new(store),
            admin_password: admin_password.into(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ScheduleStore>> {
        self.store
            .lock()
            .map_err(|_| actix_web::error::ErrorInternalServerError("schedule store is poisoned"))
    }

    fn is_admin(&self, req: &HttpRequest) -> bool {
        let password = req
            .headers()
            .get("X-Admin-Password")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        password == self.admin_password
    }
}

#[derive(Serialize)]
pub struct OutcomeResponse<'a> {
    success: bool,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmation: Option<&'a Confirmation>,
    state: Snapshot<'a>,
}

#[derive(Serialize)]
pub struct ApplicantEntry<'a> {
    #[serde(flatten)]
    applicant: &'a Applicant,
    assignment: Option<SlotLabel>,
}

#[derive(Deserialize)]
pub struct SettingsRequest {
    interview_duration: Option<u32>,
    start_time: Option<String>,
}

#[derive(Deserialize)]
pub struct AddRowRequest {
    /// Start time (HH:MM); the selected start time when absent
    start: Option<String>,
    /// Minutes; the configured interview duration when absent
    duration: Option<u32>,
}

#[derive(Deserialize)]
pub struct AddColRequest {
    /// Calendar date (YYYY-MM-DD)
    date: Option<NaiveDate>,
    /// Ready-made label (MM/DD (weekday))
    label: Option<String>,
}

#[derive(Deserialize)]
pub struct DropRequest {
    payload: DragPayload,
    target: DropTarget,
}

#[derive(Deserialize)]
pub struct TargetRequest {
    target: DropTarget,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    kind: ExportKind,
}

#[derive(Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    #[default]
    Board,
    Roster,
}

/// Reports an outcome together with the state it left behind
fn outcome_response(store: &ScheduleStore, outcome: &Outcome) -> HttpResponse {
    let (success, kind, reason) = match outcome {
        Outcome::Applied => (true, "applied", None),
        Outcome::Ignored(reason) => (false, "ignored", Some(reason.to_string())),
        Outcome::NeedsConfirmation(_) => (true, "needs_confirmation", None),
    };
    let confirmation = match outcome {
        Outcome::NeedsConfirmation(c) => Some(c),
        _ => None,
    };
    HttpResponse::Ok().json(OutcomeResponse {
        success,
        outcome: kind,
        reason,
        confirmation,
        state: store.snapshot(),
    })
}

fn bad_request(error: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": error.to_string()}))
}

// Schedule endpoints
async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.lock()?;
    Ok(HttpResponse::Ok().json(store.snapshot()))
}

async fn update_settings(
    req: web::Json<SettingsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let mut outcome = Outcome::Applied;
    if let Some(minutes) = req.interview_duration {
        outcome = store.set_interview_duration(minutes);
    }
    if let (Some(start), true) = (&req.start_time, outcome.is_applied()) {
        outcome = store.set_start_time(start);
    }
    Ok(outcome_response(&store, &outcome))
}

async fn add_row(req: web::Json<AddRowRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = match &req.start {
        Some(start) => {
            let duration = req.duration.unwrap_or(store.interview_duration());
            store.add_row(start, duration)
        }
        None => store.add_row_from_selection(),
    };
    Ok(outcome_response(&store, &outcome))
}

async fn delete_row(row: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = store.request_delete_row(row.into_inner());
    Ok(outcome_response(&store, &outcome))
}

async fn add_col(req: web::Json<AddColRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = match (req.date, &req.label) {
        (Some(date), _) => store.add_col_from_date(date),
        (None, Some(label)) => store.add_col(label),
        (None, None) => return Ok(bad_request("Either date or label is required")),
    };
    Ok(outcome_response(&store, &outcome))
}

async fn delete_col(col: web::Path<usize>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = store.request_delete_col(col.into_inner());
    Ok(outcome_response(&store, &outcome))
}

async fn toggle_slot(
    path: web::Path<(usize, usize)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (row, col) = path.into_inner();
    let mut store = state.lock()?;
    let outcome = store.toggle_slot_availability(row, col);
    Ok(outcome_response(&store, &outcome))
}

async fn click_slot(
    path: web::Path<(usize, usize)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (row, col) = path.into_inner();
    let mut store = state.lock()?;
    let outcome = store.slot_click(row, col);
    Ok(outcome_response(&store, &outcome))
}

async fn click_applicant(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = store.applicant_click(&id);
    Ok(outcome_response(&store, &outcome))
}

/// Runs a whole drag (pickup and drop) in one request
async fn drop_applicant(
    req: web::Json<DropRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let DropRequest { payload, target } = req.into_inner();
    let mut store = state.lock()?;
    let mut outcome = store.drag_start(&payload.applicant_id, payload.source);
    if outcome.is_applied() {
        outcome = store.drop_on(target);
    }
    Ok(outcome_response(&store, &outcome))
}

// Drag steps, one request per browser drag event
async fn drag_start(
    req: web::Json<DragPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let DragPayload {
        applicant_id,
        source,
    } = req.into_inner();
    let mut store = state.lock()?;
    let outcome = store.drag_start(&applicant_id, source);
    Ok(outcome_response(&store, &outcome))
}

async fn drag_enter(
    req: web::Json<TargetRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    store.drag_enter(req.target);
    Ok(outcome_response(&store, &Outcome::Applied))
}

async fn drag_leave(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    store.drag_leave();
    Ok(outcome_response(&store, &Outcome::Applied))
}

async fn drag_end(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    store.drag_end();
    Ok(outcome_response(&store, &Outcome::Applied))
}

/// Drops the applicant picked up by the last drag start
async fn drag_drop(
    req: web::Json<TargetRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = store.drop_on(req.target);
    Ok(outcome_response(&store, &outcome))
}

async fn confirm(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = store.confirm();
    Ok(outcome_response(&store, &outcome))
}

async fn cancel(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = store.cancel();
    Ok(outcome_response(&store, &outcome))
}

// Applicant endpoints
async fn list_applicants(state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.lock()?;
    let entries: Vec<ApplicantEntry> = store
        .applicants()
        .iter()
        .map(|applicant| ApplicantEntry {
            applicant,
            assignment: store.assignment_details(&applicant.id),
        })
        .collect();
    Ok(HttpResponse::Ok().json(entries))
}

async fn save_applicant(
    req: web::Json<ApplicantForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    match store.save_applicant(req.into_inner()) {
        Ok(id) => Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "id": id}))),
        Err(e) => Ok(bad_request(e)),
    }
}

async fn get_applicant(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.lock()?;
    match store.applicant_details(&id) {
        Some(details) => Ok(HttpResponse::Ok().json(details)),
        None => Ok(HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "error": "Applicant not found"}))),
    }
}

async fn delete_applicant(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = state.lock()?;
    let outcome = store.request_delete_applicant(&id);
    Ok(outcome_response(&store, &outcome))
}

// Admin CSV import endpoint
async fn import_applicants(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !state.is_admin(&req) {
        warn!("rejected CSV import with a wrong admin password");
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let forms = match read_applicants(body.as_ref()) {
        Ok(forms) => forms,
        Err(e) => return Ok(bad_request(format!("Failed to process CSV: {}", e))),
    };
    let mut store = state.lock()?;
    let imported = store.import_applicants(forms);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "imported": imported,
        "message": format!("Imported {} applicant(s)", imported)
    })))
}

async fn export_csv(
    query: web::Query<ExportQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let store = state.lock()?;
    let mut out = Vec::new();
    let (written, filename) = match query.kind {
        ExportKind::Board => (
            write_board_csv(store.schedule(), store.applicants(), &mut out),
            "schedule.csv",
        ),
        ExportKind::Roster => (
            write_roster_csv(store.schedule(), store.applicants(), &mut out),
            "applicants.csv",
        ),
    };
    written.map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(out))
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Registers the page and every API route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/settings", web::put().to(update_settings))
        .route("/api/rows", web::post().to(add_row))
        .route("/api/rows/{row}", web::delete().to(delete_row))
        .route("/api/cols", web::post().to(add_col))
        .route("/api/cols/{col}", web::delete().to(delete_col))
        .route("/api/slots/{row}/{col}/toggle", web::post().to(toggle_slot))
        .route("/api/slots/{row}/{col}/click", web::post().to(click_slot))
        .route("/api/drop", web::post().to(drop_applicant))
        .route("/api/drag/start", web::post().to(drag_start))
        .route("/api/drag/enter", web::post().to(drag_enter))
        .route("/api/drag/leave", web::post().to(drag_leave))
        .route("/api/drag/end", web::post().to(drag_end))
        .route("/api/drag/drop", web::post().to(drag_drop))
        .route("/api/confirm", web::post().to(confirm))
        .route("/api/cancel", web::post().to(cancel))
        .service(
            web::resource("/api/applicants")
                .route(web::get().to(list_applicants))
                .route(web::post().to(save_applicant)),
        )
        .service(
            web::resource("/api/applicants/{id}")
                .route(web::get().to(get_applicant))
                .route(web::delete().to(delete_applicant)),
        )
        .route("/api/applicants/{id}/click", web::post().to(click_applicant))
        .route("/api/import", web::post().to(import_applicants))
        .route("/api/export", web::get().to(export_csv));
}

pub async fn start_server(
    store: ScheduleStore,
    bind: &str,
    port: u16,
    admin_password: String,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(store, admin_password));

    info!(bind, port, "web server listening");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(configure)
    })
    .bind((bind, port))?
    .run()
    .await
}
