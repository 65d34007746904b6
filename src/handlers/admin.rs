use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use base64::Engine;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Booking;
use crate::services::auth::AuthProvider;
use crate::services::booking;
use crate::state::AppState;

/// Extracts Basic credentials and hands them to the auth collaborator.
async fn check_auth(headers: &HeaderMap, auth: &dyn AuthProvider) -> Result<(), AppError> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let encoded = header.strip_prefix("Basic ").ok_or(AppError::Unauthorized)?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AppError::Unauthorized)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AppError::Unauthorized)?;
    let (username, password) = decoded.split_once(':').ok_or(AppError::Unauthorized)?;

    let valid = auth
        .verify(username, password)
        .await
        .map_err(|e| AppError::Auth(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, state.auth.as_ref()).await?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db)?
    };

    Ok(Json(bookings))
}

// GET /api/admin/stats
#[derive(Serialize)]
pub struct StatsResponse {
    total: i64,
    pending: i64,
    approved: i64,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    check_auth(&headers, state.auth.as_ref()).await?;

    let stats = {
        let db = state.db.lock().unwrap();
        queries::get_booking_stats(&db)?
    };

    Ok(Json(StatsResponse {
        total: stats.total,
        pending: stats.pending,
        approved: stats.approved,
    }))
}

// POST /api/admin/bookings/:id/approve
pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, state.auth.as_ref()).await?;

    let booking = {
        let db = state.db.lock().unwrap();
        booking::approve(&db, &state.booking_tx, &id)?
    };

    Ok(Json(booking))
}
