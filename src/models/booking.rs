use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub full_name: String,
    pub passport_number: String,
    pub email: String,
    pub visa_type: VisaType,
    pub preferred_date: NaiveDate,
    pub submitted_date: NaiveDateTime,
    pub status: BookingStatus,
    pub appointment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => BookingStatus::Approved,
            _ => BookingStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VisaType {
    Tourist,
    Business,
    Student,
    Work,
    Family,
    Transit,
}

impl VisaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisaType::Tourist => "tourist",
            VisaType::Business => "business",
            VisaType::Student => "student",
            VisaType::Work => "work",
            VisaType::Family => "family",
            VisaType::Transit => "transit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tourist" => Some(VisaType::Tourist),
            "business" => Some(VisaType::Business),
            "student" => Some(VisaType::Student),
            "work" => Some(VisaType::Work),
            "family" => Some(VisaType::Family),
            "transit" => Some(VisaType::Transit),
            _ => None,
        }
    }
}

/// Broadcast payload emitted when a booking changes status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    pub booking_id: String,
    pub passport_number: String,
    pub status: BookingStatus,
    pub appointment_date: Option<NaiveDate>,
}

impl BookingEvent {
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id.clone(),
            passport_number: booking.passport_number.clone(),
            status: booking.status,
            appointment_date: booking.appointment_date,
        }
    }
}
