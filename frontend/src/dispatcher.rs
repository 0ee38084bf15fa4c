use log::info;
use web_sys::window;

use crate::api::ProgressRecord;
use crate::benefits::Benefit;
use crate::progress::{ProgressTracker, StepStatus};

/// Browser side effects the funnel triggers. Nothing reports back when they finish.
pub trait Browser {
    fn dial(&self, tel_uri: &str);
    fn open_tab(&self, url: &str);
    fn alert(&self, message: &str);
    fn redirect(&self, url: &str);
}

#[derive(Clone, Copy, Default, PartialEq)]
pub struct WebBrowser;

impl Browser for WebBrowser {
    fn dial(&self, tel_uri: &str) {
        if let Some(window) = window() {
            let _ = window.location().set_href(tel_uri);
        }
    }

    fn open_tab(&self, url: &str) {
        if let Some(window) = window() {
            let _ = window.open_with_url_and_target(url, "_blank");
        }
    }

    fn alert(&self, message: &str) {
        if let Some(window) = window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn redirect(&self, url: &str) {
        if let Some(window) = window() {
            let _ = window.location().set_href(url);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContactAction {
    Dial(String),
    OpenTab(String),
}

impl ContactAction {
    pub fn for_contact(contact: &str) -> Self {
        let contact = contact.trim();
        if contact.contains("http://") || contact.contains("https://") {
            ContactAction::OpenTab(contact.to_string())
        } else {
            let number: String = contact
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            ContactAction::Dial(format!("tel:{}", number))
        }
    }

    pub fn perform(&self, browser: &dyn Browser) {
        match self {
            ContactAction::Dial(uri) => browser.dial(uri),
            ContactAction::OpenTab(url) => browser.open_tab(url),
        }
    }
}

/// Handles a call-to-action on the benefit at `index`: hands off to the dialer or a new tab,
/// then records the completion. Returns the record to persist, or `None` when nothing changed
/// (a locked step, or a step that was already completed and is only being contacted again).
pub fn dispatch_cta(
    browser: &dyn Browser,
    tracker: &mut ProgressTracker,
    benefit: &Benefit,
    index: usize,
) -> Option<ProgressRecord> {
    match tracker.state().status(index) {
        StepStatus::Locked => {
            info!("Ignoring action on locked benefit {}", benefit.key());
            None
        }
        StepStatus::Completed => {
            ContactAction::for_contact(benefit.contact).perform(browser);
            None
        }
        StepStatus::Unlocked => {
            ContactAction::for_contact(benefit.contact).perform(browser);
            info!("User started {} ({})", benefit.key(), benefit.call_label);
            tracker.advance(index)
        }
    }
}
