use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Booking;
use crate::services::booking::{self, SubmitRequest};
use crate::services::notifier::{StatusNotice, StatusNotifier};
use crate::state::AppState;

// POST /api/bookings
pub async fn submit_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        booking::submit(&db, &body)?
    };

    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/lookup
#[derive(Deserialize)]
pub struct LookupQuery {
    pub value: String,
}

pub async fn lookup_booking(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Booking>, AppError> {
    let value = query.value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::Validation(
            "a passport number or email address is required".into(),
        ));
    }

    let booking = {
        let db = state.db.lock().unwrap();
        queries::find_booking(&db, &value)?
    };

    booking.map(Json).ok_or_else(|| {
        AppError::NotFound("no booking found with this passport number or email".into())
    })
}

// GET /api/bookings/events — SSE stream, one applicant's approval feed
#[derive(Deserialize)]
pub struct EventsQuery {
    pub passport_number: String,
}

fn notice_event(notice: &StatusNotice) -> Event {
    let data = serde_json::to_string(notice).unwrap_or_default();
    Event::default().data(data).event("booking_update")
}

pub async fn booking_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let passport_number = query.passport_number.trim().to_string();
    if passport_number.is_empty() {
        return Err(AppError::Validation("passport_number is required".into()));
    }

    let mut notifier = StatusNotifier::new(passport_number.clone());

    // Subscribe first, then read current state: an approval landing in
    // between shows up on one path or the other, and the notifier's
    // announce-once guard absorbs it arriving on both.
    let rx = state.booking_tx.subscribe();

    let current = {
        let db = state.db.lock().unwrap();
        queries::find_booking(&db, &passport_number)?
    };
    let catchup = notifier
        .observe_check(current.as_ref())
        .filter(|notice| matches!(notice, StatusNotice::Approved { .. }));

    let catchup_stream = tokio_stream::iter(
        catchup
            .into_iter()
            .map(|notice| Ok::<_, Infallible>(notice_event(&notice))),
    );

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) => notifier
            .observe_event(&event)
            .map(|notice| Ok(notice_event(&notice))),
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let combined = catchup_stream.chain(live_stream);
    let merged = StreamExt::merge(combined, keepalive_stream);

    Ok(Sse::new(merged))
}
