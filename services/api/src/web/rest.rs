//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the calendar REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::booking_flow::{self, BatchReport, BookingEntry, FlowError};
use crate::web::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{NaiveDate, NaiveDateTime};
use coach_calendar_core::domain::{Booking, Client, MonthRef};
use coach_calendar_core::ports::PortError;
use coach_calendar_core::scheduling::{BookingDraft, PlanError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_clients_handler,
        month_handler,
        day_handler,
        create_booking_handler,
        cancel_booking_handler,
    ),
    components(
        schemas(
            ErrorResponse,
            ClientResponse,
            BookingResponse,
            CalendarDayResponse,
            MonthLink,
            MonthResponse,
            DayBookingResponse,
            SlotResponse,
            DayResponse,
            CreateBookingRequest,
            CreateBookingResponse,
        )
    ),
    tags(
        (name = "Coach Calendar API", description = "Month view, day slots, and call bookings for a coach.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The body of every error response.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            phone: client.phone,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: String,
    pub client_id: String,
    /// `onboarding` or `follow-up`.
    pub call_type: String,
    pub call_type_label: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_minutes: u32,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            end_time: booking.end_time(),
            call_type: booking.call_type.as_str().to_string(),
            call_type_label: booking.call_type.label().to_string(),
            id: booking.id,
            client_id: booking.client_id,
            start_time: booking.start_time,
            duration_minutes: booking.duration_minutes,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CalendarDayResponse {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub bookings: Vec<BookingResponse>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MonthLink {
    pub year: i32,
    pub month: u32,
}

impl From<MonthRef> for MonthLink {
    fn from(month: MonthRef) -> Self {
        Self {
            year: month.year(),
            month: month.month(),
        }
    }
}

/// The month grid, always a whole number of Sunday-first weeks.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub previous: MonthLink,
    pub next: MonthLink,
    pub days: Vec<CalendarDayResponse>,
    pub clients: Vec<ClientResponse>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DayBookingResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub client_name: String,
}

impl From<BookingEntry> for DayBookingResponse {
    fn from(entry: BookingEntry) -> Self {
        Self {
            booking: entry.booking.into(),
            client_name: entry
                .client_name
                .unwrap_or_else(|| "Unknown Client".to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SlotResponse {
    pub start: NaiveDateTime,
    /// `HH:MM`, for display.
    pub time: String,
    pub booked: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DayResponse {
    pub date: NaiveDate,
    pub bookings: Vec<DayBookingResponse>,
    pub slots: Vec<SlotResponse>,
}

/// A booking submission. Every field is required; missing ones are reported as a 400.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub client_id: Option<String>,
    pub call_type: Option<String>,
    pub start_time: Option<NaiveDateTime>,
}

impl From<CreateBookingRequest> for BookingDraft {
    fn from(request: CreateBookingRequest) -> Self {
        Self {
            client_id: request.client_id,
            call_type: request.call_type,
            start_time: request.start_time,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateBookingResponse {
    pub requested: usize,
    pub failed: usize,
    pub message: String,
    pub created: Vec<BookingResponse>,
}

impl From<BatchReport> for CreateBookingResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            requested: report.requested,
            failed: report.failures.len(),
            message: report.summary(),
            created: report.created.into_iter().map(Into::into).collect(),
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Extractor rejections get the same JSON error body as every other failure.
fn path_rejection_response(rejection: PathRejection) -> HandlerError {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid path: {}", rejection.body_text()),
    )
}

fn json_rejection_response(rejection: JsonRejection) -> HandlerError {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid booking request: {}", rejection.body_text()),
    )
}

/// Maps a use-case failure onto the HTTP status the browser acts on.
fn flow_error_response(e: FlowError) -> HandlerError {
    match e {
        FlowError::Plan(PlanError::OverlapRejected) => error_response(
            StatusCode::CONFLICT,
            "This time slot overlaps with an existing booking. Please choose another time.",
        ),
        FlowError::Plan(e @ PlanError::InvalidRequest(_)) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        FlowError::UnknownClient(client_id) => error_response(
            StatusCode::BAD_REQUEST,
            format!("Unknown client: {}", client_id),
        ),
        FlowError::Port(PortError::NotFound(message)) => {
            error_response(StatusCode::NOT_FOUND, message)
        }
        FlowError::Port(e) => {
            error!("Booking store failure: {:?}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "The action failed, please retry.",
            )
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every client a call can be booked for.
#[utoipa::path(
    get,
    path = "/clients",
    responses(
        (status = 200, description = "All clients, ordered by name", body = [ClientResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_clients_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let clients = app_state
        .store
        .list_clients()
        .await
        .map_err(|e| flow_error_response(e.into()))?;

    let response: Vec<ClientResponse> = clients.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// Get the calendar grid for a month with the bookings of each day.
#[utoipa::path(
    get,
    path = "/calendar/{year}/{month}",
    responses(
        (status = 200, description = "The month grid", body = MonthResponse),
        (status = 400, description = "Malformed or unsupported month", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("year" = i32, Path, description = "Four-digit year."),
        ("month" = u32, Path, description = "Month number, 1 to 12.")
    )
)]
pub async fn month_handler(
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Path((year, month)) = path.map_err(path_rejection_response)?;
    let month_ref = MonthRef::new(year, month).ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("{}-{} is not a valid month", year, month),
        )
    })?;

    let view = booking_flow::month_view(app_state.store.as_ref(), month_ref)
        .await
        .map_err(flow_error_response)?;

    let response = MonthResponse {
        year: view.month.year(),
        month: view.month.month(),
        previous: view.month.previous().into(),
        next: view.month.next().into(),
        days: view
            .days
            .into_iter()
            .map(|cell| CalendarDayResponse {
                date: cell.day.date,
                in_current_month: cell.day.in_current_month,
                bookings: cell.bookings.into_iter().map(Into::into).collect(),
            })
            .collect(),
        clients: view.clients.into_iter().map(Into::into).collect(),
    };
    Ok(Json(response))
}

/// Get the bookings and bookable slots of one date.
#[utoipa::path(
    get,
    path = "/days/{date}",
    responses(
        (status = 200, description = "Bookings and slots of the date", body = DayResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("date" = String, Path, description = "Calendar date as YYYY-MM-DD.")
    )
)]
pub async fn day_handler(
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<NaiveDate>, PathRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Path(date) = path.map_err(path_rejection_response)?;
    let view = booking_flow::day_view(app_state.store.as_ref(), date)
        .await
        .map_err(flow_error_response)?;

    let response = DayResponse {
        date: view.date,
        bookings: view.bookings.into_iter().map(Into::into).collect(),
        slots: view
            .slots
            .into_iter()
            .map(|availability| SlotResponse {
                start: availability.slot.start,
                time: availability.slot.start.format("%H:%M").to_string(),
                booked: availability.booked,
            })
            .collect(),
    };
    Ok(Json(response))
}

/// Book a call. Follow-up calls are booked weekly for one year.
///
/// Only the first occurrence is checked against existing bookings.
#[utoipa::path(
    post,
    path = "/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "All bookings created", body = CreateBookingResponse),
        (status = 207, description = "Some bookings of the series could not be created", body = CreateBookingResponse),
        (status = 400, description = "Missing or invalid fields, or unknown client", body = ErrorResponse),
        (status = 409, description = "The slot overlaps an existing booking", body = ErrorResponse),
        (status = 502, description = "No booking could be created", body = CreateBookingResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_booking_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(request) = payload.map_err(json_rejection_response)?;
    let report = booking_flow::submit_booking(app_state.store.as_ref(), request.into())
        .await
        .map_err(flow_error_response)?;

    let status = if report.is_complete() {
        StatusCode::CREATED
    } else if report.nothing_created() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(CreateBookingResponse::from(report))))
}

/// Delete a single booking. Other occurrences of the same series are kept.
#[utoipa::path(
    delete,
    path = "/bookings/{booking_id}",
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 404, description = "No such booking", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("booking_id" = String, Path, description = "The id assigned when the booking was created.")
    )
)]
pub async fn cancel_booking_handler(
    State(app_state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Path(booking_id) = path.map_err(path_rejection_response)?;
    booking_flow::cancel_booking(app_state.store.as_ref(), &booking_id)
        .await
        .map_err(flow_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
