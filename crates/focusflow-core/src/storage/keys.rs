//! Key names used in the key-value store.

/// Registered [`User`](crate::accounts::User)s.
pub const USERS: &str = "focusflow_users";
/// Id of the logged-in user.
pub const CURRENT_USER: &str = "focusflow_current_user";
/// Global timer configuration.
pub const TIMER_CONFIG: &str = "focusflow_timer_config";
pub fn tasks(user_id: &str) -> String {
    format!("focusflow_tasks_{user_id}")
}

pub fn sessions(user_id: &str) -> String {
    format!("focusflow_sessions_{user_id}")
}

pub fn stats(user_id: &str) -> String {
    format!("focusflow_stats_{user_id}")
}

/// Persisted timer machine. Its focus intervals are logged for this user.
pub fn timer_engine(user_id: &str) -> String {
    format!("focusflow_timer_engine_{user_id}")
}
