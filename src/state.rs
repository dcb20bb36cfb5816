use crate::db::PortalStore;
use crate::events::AuthEvents;
use crate::middleware::RateLimiter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PortalStore>,
    pub session_key: Vec<u8>,
    pub secure_cookies: bool,
    pub auth_events: AuthEvents,
    pub login_limiter: RateLimiter,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn PortalStore>, session_key: Vec<u8>, secure_cookies: bool) -> Self {
        Self {
            store,
            session_key,
            secure_cookies,
            auth_events: AuthEvents::new(64),
            // 5 attempts per 60 seconds per IP
            login_limiter: RateLimiter::new(5, 60),
        }
    }
}
