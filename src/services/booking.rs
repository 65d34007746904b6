use chrono::{Duration, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingEvent, BookingStatus, VisaType};

/// Days between approval and the assigned examination slot.
pub const APPOINTMENT_OFFSET_DAYS: i64 = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub full_name: String,
    pub passport_number: String,
    pub email: String,
    pub visa_type: String,
    pub preferred_date: String,
}

/// Validates a submission and persists it as a pending booking.
pub fn submit(conn: &Connection, req: &SubmitRequest) -> Result<Booking, AppError> {
    let full_name = req.full_name.trim();
    let passport_number = req.passport_number.trim();
    let email = req.email.trim();

    if full_name.is_empty() {
        return Err(AppError::Validation("full_name is required".into()));
    }
    if passport_number.is_empty() {
        return Err(AppError::Validation("passport_number is required".into()));
    }
    if email.is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("email is not a valid address".into()));
    }

    let visa_type = VisaType::parse(req.visa_type.trim()).ok_or_else(|| {
        AppError::Validation(format!("unknown visa_type: {}", req.visa_type.trim()))
    })?;

    let preferred_date = NaiveDate::parse_from_str(req.preferred_date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("preferred_date must be YYYY-MM-DD".into()))?;

    let today = Utc::now().date_naive();
    if preferred_date < today {
        return Err(AppError::Validation(
            "preferred_date must not be in the past".into(),
        ));
    }

    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        full_name: full_name.to_string(),
        passport_number: passport_number.to_string(),
        email: email.to_string(),
        visa_type,
        preferred_date,
        submitted_date: Utc::now().naive_utc(),
        status: BookingStatus::Pending,
        appointment_date: None,
    };

    queries::insert_booking(conn, &booking)?;
    tracing::info!(booking_id = %booking.id, "booking submitted");

    Ok(booking)
}

/// Moves a pending booking to approved and assigns its appointment date
/// (approval date plus the fixed offset, not the applicant's preference).
/// Approved is terminal: a second approve attempt is an error and leaves
/// the stored appointment date untouched.
pub fn approve(
    conn: &Connection,
    booking_tx: &broadcast::Sender<BookingEvent>,
    id: &str,
) -> Result<Booking, AppError> {
    let appointment_date = Utc::now().date_naive() + Duration::days(APPOINTMENT_OFFSET_DAYS);

    let changed = queries::approve_booking(conn, id, appointment_date)?;
    if changed == 0 {
        // Zero rows: either the id is unknown or the transition already ran.
        return match queries::get_booking_by_id(conn, id)? {
            Some(_) => Err(AppError::AlreadyApproved),
            None => Err(AppError::NotFound(format!("no booking with id {id}"))),
        };
    }

    let booking = queries::get_booking_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("no booking with id {id}")))?;

    tracing::info!(booking_id = %booking.id, appointment_date = %appointment_date, "booking approved");

    // Notify live subscribers; ignore if nobody is listening.
    let _ = booking_tx.send(BookingEvent::from_booking(&booking));

    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_conn() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn valid_request() -> SubmitRequest {
        SubmitRequest {
            full_name: "Ada Lovelace".to_string(),
            passport_number: "P123".to_string(),
            email: "ada@example.com".to_string(),
            visa_type: "tourist".to_string(),
            preferred_date: (Utc::now().date_naive() + Duration::days(14))
                .format("%Y-%m-%d")
                .to_string(),
        }
    }

    #[test]
    fn submit_creates_pending_booking() {
        let conn = test_conn();
        let booking = submit(&conn, &valid_request()).unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.appointment_date.is_none());

        let stored = queries::get_booking_by_id(&conn, &booking.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
        assert!(stored.appointment_date.is_none());
    }

    #[test]
    fn submit_rejects_empty_full_name() {
        let conn = test_conn();
        let mut req = valid_request();
        req.full_name = "   ".to_string();

        let err = submit(&conn, &req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(queries::get_all_bookings(&conn).unwrap().is_empty());
    }

    #[test]
    fn submit_rejects_unknown_visa_type() {
        let conn = test_conn();
        let mut req = valid_request();
        req.visa_type = "diplomatic".to_string();

        let err = submit(&conn, &req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn submit_rejects_past_preferred_date() {
        let conn = test_conn();
        let mut req = valid_request();
        req.preferred_date = (Utc::now().date_naive() - Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();

        let err = submit(&conn, &req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn approve_assigns_offset_date() {
        let conn = test_conn();
        let (tx, _) = broadcast::channel(16);
        let booking = submit(&conn, &valid_request()).unwrap();

        let approved = approve(&conn, &tx, &booking.id).unwrap();

        assert_eq!(approved.status, BookingStatus::Approved);
        let expected = Utc::now().date_naive() + Duration::days(APPOINTMENT_OFFSET_DAYS);
        assert_eq!(approved.appointment_date, Some(expected));
        // The applicant's preference never leaks into the assigned slot.
        assert_ne!(approved.appointment_date, Some(approved.preferred_date));
    }

    #[test]
    fn approve_unknown_id_is_not_found() {
        let conn = test_conn();
        let (tx, _) = broadcast::channel(16);

        let err = approve(&conn, &tx, "missing").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn approve_twice_is_conflict_and_keeps_date() {
        let conn = test_conn();
        let (tx, _) = broadcast::channel(16);
        let booking = submit(&conn, &valid_request()).unwrap();

        let first = approve(&conn, &tx, &booking.id).unwrap();
        let err = approve(&conn, &tx, &booking.id).unwrap_err();
        assert!(matches!(err, AppError::AlreadyApproved));

        let stored = queries::get_booking_by_id(&conn, &booking.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.appointment_date, first.appointment_date);
    }

    #[test]
    fn approve_broadcasts_event() {
        let conn = test_conn();
        let (tx, mut rx) = broadcast::channel(16);
        let booking = submit(&conn, &valid_request()).unwrap();

        approve(&conn, &tx, &booking.id).unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.booking_id, booking.id);
        assert_eq!(event.passport_number, booking.passport_number);
        assert_eq!(event.status, BookingStatus::Approved);
        assert!(event.appointment_date.is_some());
    }

    #[test]
    fn lookup_by_passport_and_email_agree() {
        let conn = test_conn();
        let booking = submit(&conn, &valid_request()).unwrap();

        let by_passport = queries::find_booking(&conn, "P123").unwrap().unwrap();
        let by_email = queries::find_booking(&conn, "ada@example.com")
            .unwrap()
            .unwrap();

        assert_eq!(by_passport.id, booking.id);
        assert_eq!(by_email.id, booking.id);
    }
}
