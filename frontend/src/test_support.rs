//! In-memory stand-ins for the backend and the browser.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{
    Backend, EmailSubmission, NudgeInit, NudgeInitResponse, Offer, ProgressRecord, RemoteProgress,
    SmsRequest,
};
use crate::dispatcher::Browser;
use crate::error::ApiError;

fn status_error(status: u16, body: &str) -> ApiError {
    ApiError::Status { status, body: body.to_string() }
}

#[derive(Default)]
pub struct FakeBackend {
    offer: RefCell<Option<Result<Offer, u16>>>,
    progress: RefCell<Option<Result<Option<RemoteProgress>, u16>>>,
    progress_requests: RefCell<Vec<String>>,
    saved: RefCell<Vec<ProgressRecord>>,
    fail_saves: RefCell<bool>,
    immediate_message: RefCell<Option<String>>,
    nudge_inits: RefCell<Vec<NudgeInit>>,
    sms_outcomes: RefCell<HashMap<String, Result<Value, String>>>,
    sms_calls: RefCell<Vec<(String, SmsRequest)>>,
    emails: RefCell<Vec<(String, EmailSubmission)>>,
    responses: RefCell<Vec<Value>>,
    fail_responses: RefCell<bool>,
    checkouts: RefCell<Vec<String>>,
    fail_checkouts: RefCell<bool>,
}

impl FakeBackend {
    pub fn set_offer(&self, offer: Result<Offer, u16>) {
        *self.offer.borrow_mut() = Some(offer);
    }

    pub fn set_progress(&self, progress: Result<Option<RemoteProgress>, u16>) {
        *self.progress.borrow_mut() = Some(progress);
    }

    pub fn fail_saves(&self) {
        *self.fail_saves.borrow_mut() = true;
    }

    pub fn fail_responses(&self) {
        *self.fail_responses.borrow_mut() = true;
    }

    pub fn fail_checkouts(&self) {
        *self.fail_checkouts.borrow_mut() = true;
    }

    pub fn set_immediate_message(&self, message: &str) {
        *self.immediate_message.borrow_mut() = Some(message.to_string());
    }

    /// Endpoints without an outcome fail with a 404.
    pub fn set_sms_outcome(&self, endpoint: &str, outcome: Result<Value, String>) {
        self.sms_outcomes.borrow_mut().insert(endpoint.to_string(), outcome);
    }

    pub fn progress_requests(&self) -> Vec<String> {
        self.progress_requests.borrow().clone()
    }

    pub fn saved_progress(&self) -> Vec<ProgressRecord> {
        self.saved.borrow().clone()
    }

    pub fn nudge_inits(&self) -> Vec<NudgeInit> {
        self.nudge_inits.borrow().clone()
    }

    pub fn sms_calls(&self) -> Vec<(String, SmsRequest)> {
        self.sms_calls.borrow().clone()
    }

    pub fn emails(&self) -> Vec<(String, EmailSubmission)> {
        self.emails.borrow().clone()
    }

    pub fn responses(&self) -> Vec<Value> {
        self.responses.borrow().clone()
    }

    pub fn checkouts(&self) -> Vec<String> {
        self.checkouts.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Backend for FakeBackend {
    async fn fetch_offer(&self, _user_id: &str) -> Result<Offer, ApiError> {
        match self.offer.borrow().clone() {
            Some(Ok(offer)) => Ok(offer),
            Some(Err(status)) => Err(status_error(status, "offer lookup failed")),
            None => Err(status_error(404, "no offer")),
        }
    }

    async fn load_progress(&self, user_id: &str) -> Result<Option<RemoteProgress>, ApiError> {
        self.progress_requests.borrow_mut().push(user_id.to_string());
        match self.progress.borrow().clone() {
            Some(Ok(progress)) => Ok(progress),
            Some(Err(status)) => Err(status_error(status, "progress unavailable")),
            None => Ok(None),
        }
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), ApiError> {
        self.saved.borrow_mut().push(record.clone());
        if *self.fail_saves.borrow() {
            return Err(status_error(503, "store offline"));
        }
        Ok(())
    }

    async fn init_nudges(&self, request: &NudgeInit) -> Result<NudgeInitResponse, ApiError> {
        self.nudge_inits.borrow_mut().push(request.clone());
        Ok(NudgeInitResponse {
            immediate_message: self.immediate_message.borrow().clone(),
        })
    }

    async fn send_sms(&self, endpoint: &str, request: &SmsRequest) -> Result<Value, ApiError> {
        self.sms_calls
            .borrow_mut()
            .push((endpoint.to_string(), request.clone()));
        match self.sms_outcomes.borrow().get(endpoint).cloned() {
            Some(Ok(value)) => Ok(value),
            Some(Err(body)) => Err(status_error(400, &body)),
            None => Err(status_error(404, "not found")),
        }
    }

    async fn submit_email(&self, endpoint: &str, submission: &EmailSubmission) -> Result<(), ApiError> {
        self.emails
            .borrow_mut()
            .push((endpoint.to_string(), submission.clone()));
        Ok(())
    }

    async fn create_response(&self, payload: &Value) -> Result<String, ApiError> {
        if *self.fail_responses.borrow() {
            return Err(status_error(500, "could not store response"));
        }
        let mut responses = self.responses.borrow_mut();
        responses.push(payload.clone());
        Ok(format!("resp-{}", responses.len()))
    }

    async fn create_checkout(&self, variant_id: &str) -> Result<String, ApiError> {
        self.checkouts.borrow_mut().push(variant_id.to_string());
        if *self.fail_checkouts.borrow() {
            return Err(status_error(502, "stripe unavailable"));
        }
        Ok(format!("https://checkout.stripe.test/pay/{}", variant_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCall {
    Dial(String),
    OpenTab(String),
    Alert(String),
    Redirect(String),
}

#[derive(Default)]
pub struct RecordingBrowser {
    calls: RefCell<Vec<BrowserCall>>,
}

impl RecordingBrowser {
    pub fn calls(&self) -> Vec<BrowserCall> {
        self.calls.borrow().clone()
    }
}

impl Browser for RecordingBrowser {
    fn dial(&self, tel_uri: &str) {
        self.calls.borrow_mut().push(BrowserCall::Dial(tel_uri.to_string()));
    }

    fn open_tab(&self, url: &str) {
        self.calls.borrow_mut().push(BrowserCall::OpenTab(url.to_string()));
    }

    fn alert(&self, message: &str) {
        self.calls.borrow_mut().push(BrowserCall::Alert(message.to_string()));
    }

    fn redirect(&self, url: &str) {
        self.calls.borrow_mut().push(BrowserCall::Redirect(url.to_string()));
    }
}
