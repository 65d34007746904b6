pub mod booking;

pub use booking::{Booking, BookingEvent, BookingStatus, VisaType};
