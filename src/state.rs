use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::BookingEvent;
use crate::services::auth::AuthProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub auth: Box<dyn AuthProvider>,
    pub booking_tx: broadcast::Sender<BookingEvent>,
}
