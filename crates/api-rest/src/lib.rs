//! # API REST
//!
//! REST API implementation for the clinic store.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Business rules live in `clinic-core`; handlers only lock the store, call one command or
//! view, and map the result to a response.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{Local, NaiveDate};
use clinic_core::constants::SUMMARY_PLACEHOLDER;
use clinic_core::{
    summarise_best_effort, Appointment, AppointmentEdited, AppointmentInput, AppointmentRow,
    AppointmentStatus, BookingRequest, CalendarCell, CalendarMonth, ClinicError, ClinicStore,
    ClinicalHistoryEntry, Company, CompanyUpdate, ConsultationInput, ConsultationRecorded,
    ConsultationSummariser, HistoryEntryUpdate, KanbanColumn, Medication, MedicationLine,
    Overview, Patient, Professional, ProfessionalInput, RecordId, Sede, SedeInput, Service,
    ServiceInput, SummaryOutcome, Treatment, TreatmentInput, YearMonth,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers
///
/// Holds the single clinic store behind an async lock, the optional summary collaborator, and
/// the display-only summaries it has produced so far.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<ClinicStore>>,
    summariser: Option<Arc<dyn ConsultationSummariser>>,
    summaries: Arc<RwLock<HashMap<RecordId, CachedSummary>>>,
}

/// A summary together with the notes it was produced from.
#[derive(Clone)]
struct CachedSummary {
    notes: String,
    outcome: SummaryOutcome,
}

impl AppState {
    pub fn new(store: ClinicStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            summariser: None,
            summaries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_summariser(mut self, summariser: Arc<dyn ConsultationSummariser>) -> Self {
        self.summariser = Some(summariser);
        self
    }

    /// Summarises `notes` off the async runtime and records the outcome for `entry_id`.
    ///
    /// The outcome is only recorded while the entry still holds `notes`, so a slow summary of
    /// edited-away notes never replaces the current one. Without a collaborator the placeholder
    /// is returned and nothing is recorded.
    async fn summarise(&self, entry_id: RecordId, notes: String) -> SummaryOutcome {
        let Some(summariser) = self.summariser.clone() else {
            return SummaryOutcome::Unavailable(SUMMARY_PLACEHOLDER.to_string());
        };

        let summarised = notes.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            summarise_best_effort(summariser.as_ref(), &summarised)
        })
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Summary task failed: {:?}", e);
            SummaryOutcome::Unavailable(SUMMARY_PLACEHOLDER.to_string())
        });

        // Lock order: summaries, then store.
        let mut summaries = self.summaries.write().await;
        let current = {
            let store = self.store.read().await;
            let notes = store
                .state()
                .history_entry(&entry_id)
                .map(|(_, entry)| entry.notes.to_string());
            notes
        };
        if current.as_deref() == Some(notes.as_str()) {
            summaries.insert(
                entry_id,
                CachedSummary {
                    notes,
                    outcome: outcome.clone(),
                },
            );
        } else {
            tracing::debug!(entry_id = %entry_id, "discarding summary of outdated notes");
        }
        outcome
    }

    /// Starts a summary in the background; the request does not wait for it.
    fn summarise_in_background(&self, entry_id: RecordId, notes: String) {
        if self.summariser.is_none() {
            return;
        }
        let state = self.clone();
        tokio::spawn(async move {
            state.summarise(entry_id, notes).await;
        });
    }
}

type ApiError = (StatusCode, String);

/// Maps a store error to a status code, logging server-side failures.
fn reject(context: &'static str, err: ClinicError) -> ApiError {
    let status = match &err {
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        ClinicError::ConsultationNotPending(_) | ClinicError::DuplicateId(_) => {
            StatusCode::CONFLICT
        }
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("{} error: {:?}", context, err);
        (status, "Internal error".into())
    } else {
        tracing::debug!("{} rejected: {}", context, err);
        (status, err.to_string())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// Defaults to the current year.
    pub year: Option<i32>,
    /// 1-12; defaults to the current month.
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientQuery {
    /// Name fragment or phone digits.
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRes {
    #[schema(value_type = String)]
    pub entry_id: RecordId,
    /// False when `text` is the placeholder.
    pub available: bool,
    pub text: String,
}

impl SummaryRes {
    fn new(entry_id: RecordId, outcome: &SummaryOutcome) -> Self {
        Self {
            entry_id,
            available: outcome.is_summary(),
            text: outcome.text().to_string(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        book,
        list_appointments,
        create_appointment,
        edit_appointment,
        finish_consultation,
        calendar,
        board,
        overview,
        search_patients,
        get_patient,
        edit_history_entry,
        history_summary,
        list_sedes,
        create_sede,
        edit_sede,
        list_services,
        create_service,
        edit_service,
        list_professionals,
        create_professional,
        edit_professional,
        list_treatments,
        create_treatment,
        edit_treatment,
        get_company,
        update_company,
    ),
    components(schemas(
        HealthRes,
        SummaryRes,
        Appointment,
        AppointmentStatus,
        AppointmentInput,
        AppointmentEdited,
        AppointmentRow,
        BookingRequest,
        CalendarMonth,
        CalendarCell,
        YearMonth,
        KanbanColumn,
        Overview,
        Patient,
        ClinicalHistoryEntry,
        Medication,
        MedicationLine,
        ConsultationInput,
        ConsultationRecorded,
        HistoryEntryUpdate,
        Sede,
        SedeInput,
        Service,
        ServiceInput,
        Professional,
        ProfessionalInput,
        Treatment,
        TreatmentInput,
        Company,
        CompanyUpdate,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over `state`, with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/bookings", post(book))
        .route(
            "/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route("/appointments/calendar", get(calendar))
        .route("/appointments/board", get(board))
        .route("/appointments/:id", put(edit_appointment))
        .route("/appointments/:id/consultation", post(finish_consultation))
        .route("/overview", get(overview))
        .route("/patients", get(search_patients))
        .route("/patients/:id", get(get_patient))
        .route("/history/:id", put(edit_history_entry))
        .route("/history/:id/summary", get(history_summary))
        .route("/sedes", get(list_sedes).post(create_sede))
        .route("/sedes/:id", put(edit_sede))
        .route("/services", get(list_services).post(create_service))
        .route("/services/:id", put(edit_service))
        .route(
            "/professionals",
            get(list_professionals).post(create_professional),
        )
        .route("/professionals/:id", put(edit_professional))
        .route("/treatments", get(list_treatments).post(create_treatment))
        .route("/treatments/:id", put(edit_treatment))
        .route("/company", get(get_company).put(update_company))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Clinic REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/bookings",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking confirmed", body = Appointment),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Public booking portal submission
///
/// Creates a Confirmed appointment with a fresh booking code. The time must be one of the
/// offered booking slots.
async fn book(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let mut store = state.store.write().await;
    match store.book(req) {
        Ok(appointment) => Ok((StatusCode::CREATED, Json(appointment))),
        Err(e) => Err(reject("Booking", e)),
    }
}

#[utoipa::path(
    get,
    path = "/appointments",
    responses(
        (status = 200, description = "Appointments, most recent first", body = [AppointmentRow])
    )
)]
async fn list_appointments(State(state): State<AppState>) -> Json<Vec<AppointmentRow>> {
    let store = state.store.read().await;
    Json(store.state().appointment_table())
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = AppointmentInput,
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create an appointment from the admin form
async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let mut store = state.store.write().await;
    match store.create_appointment(req) {
        Ok(appointment) => Ok((StatusCode::CREATED, Json(appointment))),
        Err(e) => Err(reject("Create appointment", e)),
    }
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    request_body = AppointmentInput,
    params(("id" = String, Path, description = "Appointment identifier")),
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentEdited),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Edit an appointment
///
/// When the edit moves the appointment into Completed, the response carries
/// `consultationPending: true` and the consultation record is expected next.
async fn edit_appointment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(req): Json<AppointmentInput>,
) -> Result<Json<AppointmentEdited>, ApiError> {
    let mut store = state.store.write().await;
    store
        .edit_appointment(&id, req)
        .map(Json)
        .map_err(|e| reject("Edit appointment", e))
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/consultation",
    request_body = ConsultationInput,
    params(("id" = String, Path, description = "Appointment identifier")),
    responses(
        (status = 201, description = "Consultation recorded", body = ConsultationRecorded),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment is not awaiting a consultation record"),
        (status = 500, description = "Internal server error")
    )
)]
/// Finish the consultation of a completed appointment
///
/// Writes the clinical history entry and, for a new treatment plan, schedules the follow-up
/// appointments. A summary of the notes is requested in the background.
async fn finish_consultation(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(req): Json<ConsultationInput>,
) -> Result<(StatusCode, Json<ConsultationRecorded>), ApiError> {
    let recorded = {
        let mut store = state.store.write().await;
        store
            .finish_consultation(&id, req)
            .map_err(|e| reject("Finish consultation", e))?
    };

    state.summarise_in_background(
        recorded.entry.id.clone(),
        recorded.entry.notes.to_string(),
    );

    Ok((StatusCode::CREATED, Json(recorded)))
}

#[utoipa::path(
    get,
    path = "/appointments/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "42-cell month grid", body = CalendarMonth),
        (status = 400, description = "Invalid month")
    )
)]
async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarMonth>, ApiError> {
    let today = today();
    let current = YearMonth::containing(today);
    let month = YearMonth::new(
        query.year.unwrap_or(current.year()),
        query.month.unwrap_or(current.month()),
    )
    .map_err(|e| reject("Calendar", e))?;

    let store = state.store.read().await;
    Ok(Json(store.state().calendar_grid(month, today)))
}

#[utoipa::path(
    get,
    path = "/appointments/board",
    responses(
        (status = 200, description = "One column per status", body = [KanbanColumn])
    )
)]
async fn board(State(state): State<AppState>) -> Json<Vec<KanbanColumn>> {
    let store = state.store.read().await;
    Json(store.state().kanban_board())
}

#[utoipa::path(
    get,
    path = "/overview",
    responses(
        (status = 200, description = "Dashboard counters", body = Overview)
    )
)]
async fn overview(State(state): State<AppState>) -> Json<Overview> {
    let store = state.store.read().await;
    Json(store.state().overview(today()))
}

#[utoipa::path(
    get,
    path = "/patients",
    params(PatientQuery),
    responses(
        (status = 200, description = "Matching patients", body = [Patient])
    )
)]
async fn search_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientQuery>,
) -> Json<Vec<Patient>> {
    let store = state.store.read().await;
    let patients = store
        .state()
        .search_patients(query.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Json(patients)
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient file with history", body = Patient),
        (status = 404, description = "Patient not found")
    )
)]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
) -> Result<Json<Patient>, ApiError> {
    let store = state.store.read().await;
    match store.state().patient(&id) {
        Some(patient) => Ok(Json(patient.clone())),
        None => Err(reject("Get patient", ClinicError::PatientNotFound(id))),
    }
}

#[utoipa::path(
    put,
    path = "/history/{id}",
    request_body = HistoryEntryUpdate,
    params(("id" = String, Path, description = "History entry identifier")),
    responses(
        (status = 200, description = "Entry updated", body = ClinicalHistoryEntry),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Entry not found")
    )
)]
/// Edit a clinical history entry
///
/// Any summary produced for the old notes is discarded and a new one requested.
async fn edit_history_entry(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(req): Json<HistoryEntryUpdate>,
) -> Result<Json<ClinicalHistoryEntry>, ApiError> {
    let entry = {
        let mut store = state.store.write().await;
        store
            .edit_history_entry(&id, req)
            .map_err(|e| reject("Edit history entry", e))?
    };

    state.summaries.write().await.remove(&entry.id);
    state.summarise_in_background(entry.id.clone(), entry.notes.to_string());

    Ok(Json(entry))
}

#[utoipa::path(
    get,
    path = "/history/{id}/summary",
    params(("id" = String, Path, description = "History entry identifier")),
    responses(
        (status = 200, description = "Summary, or the placeholder when unavailable", body = SummaryRes),
        (status = 404, description = "Entry not found")
    )
)]
/// Display-only summary of a history entry's notes
async fn history_summary(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
) -> Result<Json<SummaryRes>, ApiError> {
    let cached = state.summaries.read().await.get(&id).cloned();

    let notes = {
        let store = state.store.read().await;
        match store.state().history_entry(&id) {
            Some((_, entry)) => entry.notes.to_string(),
            None => {
                return Err(reject(
                    "History summary",
                    ClinicError::HistoryEntryNotFound(id),
                ))
            }
        }
    };

    if let Some(cached) = cached.filter(|c| c.notes == notes) {
        return Ok(Json(SummaryRes::new(id, &cached.outcome)));
    }

    let outcome = state.summarise(id.clone(), notes).await;
    Ok(Json(SummaryRes::new(id, &outcome)))
}

#[utoipa::path(get, path = "/sedes", responses((status = 200, body = [Sede])))]
async fn list_sedes(State(state): State<AppState>) -> Json<Vec<Sede>> {
    let store = state.store.read().await;
    Json(store.state().sedes().to_vec())
}

#[utoipa::path(
    post,
    path = "/sedes",
    request_body = SedeInput,
    responses(
        (status = 201, description = "Sede created", body = Sede),
        (status = 400, description = "Bad request")
    )
)]
async fn create_sede(
    State(state): State<AppState>,
    Json(req): Json<SedeInput>,
) -> Result<(StatusCode, Json<Sede>), ApiError> {
    let mut store = state.store.write().await;
    store
        .create_sede(req)
        .map(|sede| (StatusCode::CREATED, Json(sede)))
        .map_err(|e| reject("Create sede", e))
}

#[utoipa::path(
    put,
    path = "/sedes/{id}",
    request_body = SedeInput,
    params(("id" = String, Path, description = "Sede identifier")),
    responses(
        (status = 200, description = "Sede updated", body = Sede),
        (status = 400, description = "Bad request or unknown sede")
    )
)]
async fn edit_sede(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(req): Json<SedeInput>,
) -> Result<Json<Sede>, ApiError> {
    let mut store = state.store.write().await;
    store
        .edit_sede(&id, req)
        .map(Json)
        .map_err(|e| reject("Edit sede", e))
}

#[utoipa::path(get, path = "/services", responses((status = 200, body = [Service])))]
async fn list_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    let store = state.store.read().await;
    Json(store.state().services().to_vec())
}

#[utoipa::path(
    post,
    path = "/services",
    request_body = ServiceInput,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 400, description = "Bad request")
    )
)]
async fn create_service(
    State(state): State<AppState>,
    Json(req): Json<ServiceInput>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    let mut store = state.store.write().await;
    store
        .create_service(req)
        .map(|service| (StatusCode::CREATED, Json(service)))
        .map_err(|e| reject("Create service", e))
}

#[utoipa::path(
    put,
    path = "/services/{id}",
    request_body = ServiceInput,
    params(("id" = String, Path, description = "Service identifier")),
    responses(
        (status = 200, description = "Service updated", body = Service),
        (status = 400, description = "Bad request or unknown service")
    )
)]
async fn edit_service(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(req): Json<ServiceInput>,
) -> Result<Json<Service>, ApiError> {
    let mut store = state.store.write().await;
    store
        .edit_service(&id, req)
        .map(Json)
        .map_err(|e| reject("Edit service", e))
}

#[utoipa::path(get, path = "/professionals", responses((status = 200, body = [Professional])))]
async fn list_professionals(State(state): State<AppState>) -> Json<Vec<Professional>> {
    let store = state.store.read().await;
    Json(store.state().professionals().to_vec())
}

#[utoipa::path(
    post,
    path = "/professionals",
    request_body = ProfessionalInput,
    responses(
        (status = 201, description = "Professional created", body = Professional),
        (status = 400, description = "Bad request or unknown sede")
    )
)]
async fn create_professional(
    State(state): State<AppState>,
    Json(req): Json<ProfessionalInput>,
) -> Result<(StatusCode, Json<Professional>), ApiError> {
    let mut store = state.store.write().await;
    store
        .create_professional(req)
        .map(|professional| (StatusCode::CREATED, Json(professional)))
        .map_err(|e| reject("Create professional", e))
}

#[utoipa::path(
    put,
    path = "/professionals/{id}",
    request_body = ProfessionalInput,
    params(("id" = String, Path, description = "Professional identifier")),
    responses(
        (status = 200, description = "Professional updated", body = Professional),
        (status = 400, description = "Bad request or unknown professional")
    )
)]
async fn edit_professional(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(req): Json<ProfessionalInput>,
) -> Result<Json<Professional>, ApiError> {
    let mut store = state.store.write().await;
    store
        .edit_professional(&id, req)
        .map(Json)
        .map_err(|e| reject("Edit professional", e))
}

#[utoipa::path(get, path = "/treatments", responses((status = 200, body = [Treatment])))]
async fn list_treatments(State(state): State<AppState>) -> Json<Vec<Treatment>> {
    let store = state.store.read().await;
    Json(store.state().treatments().to_vec())
}

#[utoipa::path(
    post,
    path = "/treatments",
    request_body = TreatmentInput,
    responses(
        (status = 201, description = "Treatment created", body = Treatment),
        (status = 400, description = "Bad request")
    )
)]
async fn create_treatment(
    State(state): State<AppState>,
    Json(req): Json<TreatmentInput>,
) -> Result<(StatusCode, Json<Treatment>), ApiError> {
    let mut store = state.store.write().await;
    store
        .create_treatment(req)
        .map(|treatment| (StatusCode::CREATED, Json(treatment)))
        .map_err(|e| reject("Create treatment", e))
}

#[utoipa::path(
    put,
    path = "/treatments/{id}",
    request_body = TreatmentInput,
    params(("id" = String, Path, description = "Treatment identifier")),
    responses(
        (status = 200, description = "Treatment updated", body = Treatment),
        (status = 400, description = "Bad request or unknown treatment")
    )
)]
async fn edit_treatment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(req): Json<TreatmentInput>,
) -> Result<Json<Treatment>, ApiError> {
    let mut store = state.store.write().await;
    store
        .edit_treatment(&id, req)
        .map(Json)
        .map_err(|e| reject("Edit treatment", e))
}

#[utoipa::path(get, path = "/company", responses((status = 200, body = Company)))]
async fn get_company(State(state): State<AppState>) -> Json<Company> {
    let store = state.store.read().await;
    Json(store.state().company().clone())
}

#[utoipa::path(
    put,
    path = "/company",
    request_body = CompanyUpdate,
    responses(
        (status = 200, description = "Branding updated", body = Company),
        (status = 400, description = "Bad request")
    )
)]
async fn update_company(
    State(state): State<AppState>,
    Json(req): Json<CompanyUpdate>,
) -> Result<Json<Company>, ApiError> {
    let mut store = state.store.write().await;
    store
        .update_company(req)
        .map(Json)
        .map_err(|e| reject("Update company", e))
}
