#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    "http://localhost:3001"  // Development URL when running locally
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    match option_env!("FUNNEL_BACKEND_URL") {
        Some(url) => url,
        None => "",  // Same origin in production
    }
}

// Tried in order until one accepts the message.
pub const SMS_ENDPOINTS: &[&str] = &["/api/notify/sms", "/notify/sms", "/rag/notify/sms"];

pub const LAST_USER_KEY: &str = "mbai:last_user";
pub const LAST_PHONE_KEY: &str = "mbai:last_phone";
pub const FIRST_SMS_KEY_PREFIX: &str = "nudges:first_sms";
pub const SESSION_ID_KEY: &str = "session_id";

pub const DEFAULT_CHECKOUT_VARIANT: &str = "one-dollar-activation";

// Carrier error returned when the recipient has replied STOP.
pub const SMS_OPT_OUT_CODE: &str = "21610";

pub const DEFAULT_SMS_TEMPLATE: &str =
    "Hi {name}, your benefits are ready. Open your link to claim them before they expire.";
