use thiserror::Error;

use crate::config;

/// Errors from a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] gloo_net::Error),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Every SMS endpoint failed. Attempts are kept in the order they were tried.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("sms delivery failed: {}", join_attempts(.attempts))]
pub struct SmsError {
    pub attempts: Vec<(String, String)>,
}

fn join_attempts(attempts: &[(String, String)]) -> String {
    attempts
        .iter()
        .map(|(url, e)| format!("{url}: {e}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

impl SmsError {
    pub fn is_opt_out(&self) -> bool {
        self.attempts
            .iter()
            .any(|(_, e)| contains_code(e, config::SMS_OPT_OUT_CODE))
    }
}

/// True when `code` appears as a whole number, not inside a longer run of digits.
fn contains_code(text: &str, code: &str) -> bool {
    text.match_indices(code).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + code.len()..].chars().next();
        !before.map_or(false, |c| c.is_ascii_digit()) && !after.map_or(false, |c| c.is_ascii_digit())
    })
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnswerError {
    #[error("Please tell us your name.")]
    EmptyName,
    #[error("Please enter your age as a number between 18 and 120.")]
    Age,
    #[error("Please enter a 5 digit zip code.")]
    Zip,
    #[error("Please enter a valid phone number.")]
    Phone,
    #[error("Please enter a valid email address.")]
    Email,
    #[error("Please answer yes or no.")]
    YesNo,
    #[error("Please pick one of: {0}")]
    Choice(String),
    #[error("The conversation is already finished.")]
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sms_error_joins_attempts_in_order() {
        let err = SmsError {
            attempts: vec![
                ("/a".to_string(), "timeout".to_string()),
                ("/b".to_string(), "status 500".to_string()),
            ],
        };
        assert_eq!(err.to_string(), "sms delivery failed: /a: timeout | /b: status 500");
        assert!(!err.is_opt_out());
    }

    #[test]
    fn opt_out_code_is_detected_in_any_attempt() {
        let err = SmsError {
            attempts: vec![
                ("/a".to_string(), "status 404".to_string()),
                ("/b".to_string(), "Twilio error 21610: unsubscribed recipient".to_string()),
            ],
        };
        assert!(err.is_opt_out());

        let json_body = SmsError {
            attempts: vec![("/a".to_string(), r#"status 400: {"code":21610,"message":"unsubscribed"}"#.to_string())],
        };
        assert!(json_body.is_opt_out());
    }

    #[test]
    fn opt_out_code_inside_a_phone_number_is_ignored() {
        let err = SmsError {
            attempts: vec![("/a".to_string(), "invalid recipient +12161055555".to_string())],
        };
        assert!(!err.is_opt_out());
    }
}
