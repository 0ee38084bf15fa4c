use log::{error, info, warn};
use serde_json::Value;

use crate::api::{Backend, NudgeInit, SmsRequest};
use crate::config;
use crate::dispatcher::Browser;
use crate::error::SmsError;
use crate::session::SessionContext;

/// Tries each endpoint in order and returns the first success.
pub async fn send_with_fallback<B: Backend + ?Sized>(
    backend: &B,
    endpoints: &[&str],
    request: &SmsRequest,
) -> Result<Value, SmsError> {
    let mut attempts = Vec::new();
    for endpoint in endpoints {
        match backend.send_sms(endpoint, request).await {
            Ok(ack) => {
                if !attempts.is_empty() {
                    info!("SMS delivered via {} after {} failed attempt(s)", endpoint, attempts.len());
                }
                return Ok(ack);
            }
            Err(e) => attempts.push((endpoint.to_string(), e.to_string())),
        }
    }
    Err(SmsError { attempts })
}

#[derive(Debug, Clone, PartialEq)]
pub enum BootSmsOutcome {
    AlreadySent,
    Sent,
    Failed,
}

/// Starts the nudge sequence and sends the first text once per user and phone in this session.
pub async fn send_boot_sms<B: Backend + ?Sized>(
    backend: &B,
    session: &SessionContext,
    browser: &dyn Browser,
    user_id: &str,
    phone: &str,
    full_name: &str,
) -> BootSmsOutcome {
    if session.first_sms_sent(user_id, phone) {
        return BootSmsOutcome::AlreadySent;
    }

    let init = NudgeInit {
        user_id: user_id.to_string(),
        to: phone.to_string(),
        full_name: full_name.to_string(),
    };
    let immediate = match backend.init_nudges(&init).await {
        Ok(response) => response.immediate_message,
        Err(e) => {
            warn!("Failed to start nudges for {}: {}", user_id, e);
            None
        }
    };
    let message = immediate
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default_message(full_name));

    let request = SmsRequest {
        user_id: user_id.to_string(),
        to: phone.to_string(),
        full_name: full_name.to_string(),
        message,
    };
    match send_with_fallback(backend, config::SMS_ENDPOINTS, &request).await {
        Ok(_) => {
            session.mark_first_sms_sent(user_id, phone);
            BootSmsOutcome::Sent
        }
        Err(e) => {
            error!("{}", e);
            if e.is_opt_out() {
                browser.alert(
                    "Your number has opted out of text messages. Text START to our number to receive your benefit details.",
                );
            }
            BootSmsOutcome::Failed
        }
    }
}

fn default_message(full_name: &str) -> String {
    let first_name = full_name.split_whitespace().next().unwrap_or("there");
    config::DEFAULT_SMS_TEMPLATE.replace("{name}", first_name)
}
