use crate::tracker::SharedSession;

#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    /// Dashboard auto-refresh period, seconds.
    pub refresh_secs: u64,
}
