use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, VisaType};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str = "id, full_name, passport_number, email, visa_type, \
     preferred_date, submitted_date, status, appointment_date";

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, full_name, passport_number, email, visa_type, preferred_date, submitted_date, status, appointment_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            booking.id,
            booking.full_name,
            booking.passport_number,
            booking.email,
            booking.visa_type.as_str(),
            booking.preferred_date.format(DATE_FMT).to_string(),
            booking.submitted_date.format(DATETIME_FMT).to_string(),
            booking.status.as_str(),
            booking
                .appointment_date
                .map(|d| d.format(DATE_FMT).to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let result = conn.query_row(&sql, params![id], |row| Ok(parse_booking_row(row)));

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Point lookup by the natural keys: a single search value matched against
/// either passport_number or email.
pub fn find_booking(conn: &Connection, value: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE passport_number = ?1 OR email = ?1
         ORDER BY submitted_date DESC LIMIT 1"
    );
    let result = conn.query_row(&sql, params![value], |row| Ok(parse_booking_row(row)));

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY submitted_date DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Atomic approve: status and appointment_date move together in a single
/// statement, and only off the pending state. Returns the number of rows
/// changed (0 when the booking is missing or already approved).
pub fn approve_booking(
    conn: &Connection,
    id: &str,
    appointment_date: NaiveDate,
) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'approved', appointment_date = ?1
         WHERE id = ?2 AND status = 'pending'",
        params![appointment_date.format(DATE_FMT).to_string(), id],
    )?;
    Ok(count)
}

pub struct BookingStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
}

pub fn get_booking_stats(conn: &Connection) -> anyhow::Result<BookingStats> {
    conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(status = 'pending'), 0),
                COALESCE(SUM(status = 'approved'), 0)
         FROM bookings",
        [],
        |row| {
            Ok(BookingStats {
                total: row.get(0)?,
                pending: row.get(1)?,
                approved: row.get(2)?,
            })
        },
    )
    .map_err(Into::into)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let full_name: String = row.get(1)?;
    let passport_number: String = row.get(2)?;
    let email: String = row.get(3)?;
    let visa_type_str: String = row.get(4)?;
    let preferred_date_str: String = row.get(5)?;
    let submitted_date_str: String = row.get(6)?;
    let status_str: String = row.get(7)?;
    let appointment_date_str: Option<String> = row.get(8)?;

    let preferred_date = NaiveDate::parse_from_str(&preferred_date_str, DATE_FMT)
        .unwrap_or_else(|_| Utc::now().date_naive());
    let submitted_date = NaiveDateTime::parse_from_str(&submitted_date_str, DATETIME_FMT)
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let appointment_date = appointment_date_str
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FMT).ok());

    Ok(Booking {
        id,
        full_name,
        passport_number,
        email,
        visa_type: VisaType::parse(&visa_type_str).unwrap_or(VisaType::Tourist),
        preferred_date,
        submitted_date,
        status: BookingStatus::parse(&status_str),
        appointment_date,
    })
}
