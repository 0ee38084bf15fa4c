use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen_futures::spawn_local;

use crate::api::{Backend, EmailSubmission, ProgressRecord};
use crate::dispatcher::Browser;
use crate::progress;
use crate::session::SessionContext;
use crate::sms::{self, BootSmsOutcome};

/// Side effects requested by the UI. Components emit these and never wait on the outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SubmitEmail {
        endpoint: &'static str,
        submission: EmailSubmission,
    },
    BootSms {
        user_id: String,
        phone: String,
        full_name: String,
    },
    PersistProgress(ProgressRecord),
}

#[derive(Clone)]
pub struct EffectDispatcher {
    backend: Rc<dyn Backend>,
    browser: Rc<dyn Browser>,
    session: SessionContext,
}

impl PartialEq for EffectDispatcher {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.backend, &other.backend)
            && Rc::ptr_eq(&self.browser, &other.browser)
            && self.session == other.session
    }
}

impl EffectDispatcher {
    pub fn new(backend: Rc<dyn Backend>, browser: Rc<dyn Browser>, session: SessionContext) -> Self {
        Self { backend, browser, session }
    }

    pub fn backend(&self) -> Rc<dyn Backend> {
        self.backend.clone()
    }

    pub fn browser(&self) -> Rc<dyn Browser> {
        self.browser.clone()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Fire and forget on the browser's task queue.
    pub fn emit(&self, intent: Intent) {
        let dispatcher = self.clone();
        spawn_local(async move {
            dispatcher.run(intent).await;
        });
    }

    pub async fn run(&self, intent: Intent) {
        match intent {
            Intent::SubmitEmail { endpoint, submission } => {
                match self.backend.submit_email(endpoint, &submission).await {
                    Ok(()) => info!("Email captured for {}", submission.user_id),
                    Err(e) => warn!("Email submit to {} failed: {}", endpoint, e),
                }
            }
            Intent::BootSms { user_id, phone, full_name } => {
                let outcome = sms::send_boot_sms(
                    self.backend.as_ref(),
                    &self.session,
                    self.browser.as_ref(),
                    &user_id,
                    &phone,
                    &full_name,
                )
                .await;
                if outcome == BootSmsOutcome::Sent {
                    info!("First SMS sent to {}", user_id);
                }
            }
            Intent::PersistProgress(record) => {
                progress::persist(self.backend.as_ref(), &record).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeBackend, RecordingBrowser};
    use futures::executor::block_on;
    use serde_json::json;

    fn dispatcher(backend: Rc<FakeBackend>) -> EffectDispatcher {
        EffectDispatcher::new(backend, Rc::new(RecordingBrowser::default()), SessionContext::in_memory())
    }

    #[test]
    fn email_intent_posts_to_variant_endpoint() {
        let backend = Rc::new(FakeBackend::default());
        let effects = dispatcher(backend.clone());
        let submission = EmailSubmission {
            email: "ada@example.com".to_string(),
            name: "Ada Lovelace".to_string(),
            user_id: "u-1".to_string(),
        };
        block_on(effects.run(Intent::SubmitEmail {
            endpoint: "/email/submit2",
            submission: submission.clone(),
        }));
        assert_eq!(backend.emails(), vec![("/email/submit2".to_string(), submission)]);
    }

    #[test]
    fn boot_sms_intent_is_guarded_by_the_session() {
        let backend = Rc::new(FakeBackend::default());
        backend.set_sms_outcome("/api/notify/sms", Ok(json!({ "ok": true })));
        let effects = dispatcher(backend.clone());
        let intent = Intent::BootSms {
            user_id: "u-1".to_string(),
            phone: "+15551234567".to_string(),
            full_name: "Ada".to_string(),
        };
        block_on(effects.run(intent.clone()));
        block_on(effects.run(intent));
        assert_eq!(backend.sms_calls().len(), 1);
        assert!(effects.session().first_sms_sent("u-1", "+15551234567"));
    }

    #[test]
    fn progress_intent_saves_record() {
        let backend = Rc::new(FakeBackend::default());
        let effects = dispatcher(backend.clone());
        let record = ProgressRecord {
            user_id: "u-1".to_string(),
            benefits: vec!["Debt".to_string(), "Auto".to_string()],
            completed: vec![true, false],
            unlocked_count: 2,
            active_index: 1,
        };
        block_on(effects.run(Intent::PersistProgress(record.clone())));
        assert_eq!(backend.saved_progress(), vec![record]);
    }
}
