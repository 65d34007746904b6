use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Booking, BookingEvent, BookingStatus};

/// What a status check or change event means for the applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusNotice {
    Approved {
        appointment_date: Option<NaiveDate>,
    },
    StillPending,
    NotFound,
}

/// Per-session notifier for one applicant, keyed by passport number.
///
/// Both delivery paths run through the same instance: push events from the
/// live change feed and explicit pull checks. The approval notice is
/// announced at most once per session, however many duplicate events or
/// repeat checks report the same transition.
pub struct StatusNotifier {
    passport_number: String,
    announced: bool,
}

impl StatusNotifier {
    pub fn new(passport_number: impl Into<String>) -> Self {
        Self {
            passport_number: passport_number.into(),
            announced: false,
        }
    }

    pub fn passport_number(&self) -> &str {
        &self.passport_number
    }

    pub fn announced(&self) -> bool {
        self.announced
    }

    /// Push path: feed a change event from the store's live feed.
    /// Returns a notice only for the first approved event matching this
    /// session's passport number.
    pub fn observe_event(&mut self, event: &BookingEvent) -> Option<StatusNotice> {
        if event.passport_number != self.passport_number {
            return None;
        }
        if event.status != BookingStatus::Approved || self.announced {
            return None;
        }
        self.announced = true;
        Some(StatusNotice::Approved {
            appointment_date: event.appointment_date,
        })
    }

    /// Pull path: feed the result of an explicit point lookup. A pending
    /// booking always yields the neutral notice; an approved booking yields
    /// the success notice only if it has not been announced yet.
    pub fn observe_check(&mut self, booking: Option<&Booking>) -> Option<StatusNotice> {
        let booking = match booking {
            Some(b) => b,
            None => return Some(StatusNotice::NotFound),
        };

        match booking.status {
            BookingStatus::Pending => Some(StatusNotice::StillPending),
            BookingStatus::Approved => {
                if self.announced {
                    return None;
                }
                self.announced = true;
                Some(StatusNotice::Approved {
                    appointment_date: booking.appointment_date,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::VisaType;

    fn approved_event(passport: &str) -> BookingEvent {
        BookingEvent {
            booking_id: "b1".to_string(),
            passport_number: passport.to_string(),
            status: BookingStatus::Approved,
            appointment_date: NaiveDate::from_ymd_opt(2025, 1, 13),
        }
    }

    fn booking(passport: &str, status: BookingStatus) -> Booking {
        let appointment_date = match status {
            BookingStatus::Approved => NaiveDate::from_ymd_opt(2025, 1, 13),
            BookingStatus::Pending => None,
        };
        Booking {
            id: "b1".to_string(),
            full_name: "Ada Lovelace".to_string(),
            passport_number: passport.to_string(),
            email: "ada@example.com".to_string(),
            visa_type: VisaType::Tourist,
            preferred_date: Utc::now().date_naive(),
            submitted_date: Utc::now().naive_utc(),
            status,
            appointment_date,
        }
    }

    #[test]
    fn push_event_announces_once() {
        let mut notifier = StatusNotifier::new("P123");
        let event = approved_event("P123");

        let first = notifier.observe_event(&event);
        assert!(matches!(first, Some(StatusNotice::Approved { .. })));

        // The feed may replay the same transition; duplicates are absorbed.
        assert_eq!(notifier.observe_event(&event), None);
        assert_eq!(notifier.observe_event(&event), None);
    }

    #[test]
    fn push_ignores_other_passports() {
        let mut notifier = StatusNotifier::new("P123");
        assert_eq!(notifier.observe_event(&approved_event("P999")), None);
        assert!(!notifier.announced());
    }

    #[test]
    fn pull_after_push_does_not_reannounce() {
        let mut notifier = StatusNotifier::new("P123");
        notifier.observe_event(&approved_event("P123"));

        let b = booking("P123", BookingStatus::Approved);
        assert_eq!(notifier.observe_check(Some(&b)), None);
    }

    #[test]
    fn pull_announces_when_push_missed_it() {
        let mut notifier = StatusNotifier::new("P123");

        let b = booking("P123", BookingStatus::Approved);
        let notice = notifier.observe_check(Some(&b));
        assert!(matches!(notice, Some(StatusNotice::Approved { .. })));

        // A late push event for the same transition stays silent.
        assert_eq!(notifier.observe_event(&approved_event("P123")), None);
    }

    #[test]
    fn pull_reports_still_pending_every_time() {
        let mut notifier = StatusNotifier::new("P123");
        let b = booking("P123", BookingStatus::Pending);

        assert_eq!(
            notifier.observe_check(Some(&b)),
            Some(StatusNotice::StillPending)
        );
        assert_eq!(
            notifier.observe_check(Some(&b)),
            Some(StatusNotice::StillPending)
        );
        assert!(!notifier.announced());
    }

    #[test]
    fn pull_reports_missing_booking() {
        let mut notifier = StatusNotifier::new("P123");
        assert_eq!(notifier.observe_check(None), Some(StatusNotice::NotFound));
    }
}
