use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AvailabilityCheck, CalendarEvent, CalendarWindow, EventFilter, EventPatch, Granularity,
    Holiday, Lesson, NewEvent, SchoolCalendar, StoreError, datetime,
};

#[derive(Clone)]
pub struct AppState {
    calendar: Arc<RwLock<SchoolCalendar>>,
}

impl AppState {
    pub fn new(calendar: SchoolCalendar) -> Self {
        Self {
            calendar: Arc::new(RwLock::new(calendar)),
        }
    }

    pub fn with_shared(calendar: Arc<RwLock<SchoolCalendar>>) -> Self {
        Self { calendar }
    }

    fn calendar(&self) -> Arc<RwLock<SchoolCalendar>> {
        self.calendar.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => ApiError::NotFound(value.to_string()),
            StoreError::DuplicateId(_) => ApiError::Conflict(value.to_string()),
            StoreError::InvalidRange { .. } | StoreError::Validation(_) => {
                ApiError::Invalid(value.to_string())
            }
        }
    }
}

impl From<datetime::DateParseError> for ApiError {
    fn from(value: datetime::DateParseError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct MovePayload {
    start: NaiveDateTime,
    #[serde(default)]
    end: Option<NaiveDateTime>,
}

#[derive(Debug, Default, Deserialize)]
struct DayQuery {
    #[serde(default)]
    spanning: bool,
}

#[derive(Debug, Default, Deserialize)]
struct WindowQuery {
    date: Option<String>,
    granularity: Option<String>,
    now: Option<String>,
}

#[derive(Debug, Serialize)]
struct WindowResponse<'a> {
    date: NaiveDate,
    granularity: Granularity,
    first: NaiveDate,
    last: NaiveDate,
    window: CalendarWindow,
    events: Vec<&'a CalendarEvent>,
}

#[derive(Debug, Default, Deserialize)]
struct HolidayQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityPayload {
    reference_date: NaiveDate,
    #[serde(default)]
    lessons: Vec<Lesson>,
    candidate: Lesson,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/:id/move", post(move_event))
        .route("/days/:date/events", get(day_events))
        .route("/window", get(window))
        .route("/holidays", get(list_holidays))
        .route("/availability", post(check_availability))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, calendar: SchoolCalendar) -> std::io::Result<()> {
    let state = AppState::new(calendar);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "school-calendar HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Json<Vec<CalendarEvent>> {
    let calendar = state.calendar();
    let events = {
        let guard = calendar.read();
        guard.filter_events(&filter).into_iter().cloned().collect()
    };
    Json(events)
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let calendar = state.calendar();
    let guard = calendar.read();
    guard
        .find_event(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))
}

async fn create_event(
    State(state): State<AppState>,
    Json(new_event): Json<NewEvent>,
) -> Result<(StatusCode, Json<CalendarEvent>), ApiError> {
    let calendar = state.calendar();
    let created = {
        let mut guard = calendar.write();
        guard.create_event(new_event)?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<CalendarEvent>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::invalid("patch must change at least one field"));
    }
    let calendar = state.calendar();
    let updated = {
        let mut guard = calendar.write();
        guard.update_event(&id, &patch)?
    };
    Ok(Json(updated))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let calendar = state.calendar();
    {
        let mut guard = calendar.write();
        guard.delete_event(&id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn move_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MovePayload>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let calendar = state.calendar();
    let moved = {
        let mut guard = calendar.write();
        let end = match payload.end {
            Some(end) => end,
            None => {
                let event = guard
                    .find_event(&id)
                    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
                payload.start + event.duration()
            }
        };
        guard.move_event(&id, payload.start, end)?
    };
    Ok(Json(moved))
}

async fn day_events(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    let day = datetime::parse_date(&date)?;
    let calendar = state.calendar();
    let guard = calendar.read();
    let events = if query.spanning {
        guard.events_spanning_day(day)
    } else {
        guard.events_for_day(day)
    };
    Ok(Json(events.into_iter().cloned().collect()))
}

async fn window(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiError> {
    let now = match query.now.as_deref() {
        Some(now) => datetime::parse_event_datetime(now)?,
        None => Local::now().naive_local(),
    };
    let date = match query.date.as_deref() {
        Some(date) => datetime::parse_date(date)?,
        None => now.date(),
    };
    let granularity = match query.granularity.as_deref() {
        Some(granularity) => granularity
            .parse::<Granularity>()
            .map_err(ApiError::invalid)?,
        None => Granularity::Month,
    };

    let calendar = state.calendar();
    let guard = calendar.read();
    let (first, last) = crate::window::date_range(date, granularity, guard.config().week_start);
    let body = WindowResponse {
        date,
        granularity,
        first,
        last,
        window: guard.window(date, granularity, now),
        events: guard.events_in_window(date, granularity),
    };
    Ok(Json(body).into_response())
}

async fn list_holidays(
    State(state): State<AppState>,
    Query(query): Query<HolidayQuery>,
) -> Result<Json<Vec<Holiday>>, ApiError> {
    let calendar = state.calendar();
    let guard = calendar.read();
    let holidays = match (query.from.as_deref(), query.to.as_deref()) {
        (None, None) => guard.holidays().holidays(),
        (from, to) => {
            let year = guard.academic_year();
            let from = from.map(datetime::parse_date).transpose()?.unwrap_or(year.start);
            let to = to.map(datetime::parse_date).transpose()?.unwrap_or(year.end);
            guard.holidays().holidays_in_range(from, to)
        }
    };
    Ok(Json(holidays))
}

async fn check_availability(
    State(state): State<AppState>,
    Json(payload): Json<AvailabilityPayload>,
) -> Json<AvailabilityCheck> {
    let calendar = state.calendar();
    let check = {
        let guard = calendar.read();
        guard.check_lesson_availability(&payload.lessons, &payload.candidate, payload.reference_date)
    };
    Json(check)
}
