use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use web_sys::{window, Storage};

use crate::config;

/// Minimal string key/value store. Implemented over browser storage and in memory.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

pub struct BrowserStore {
    storage: Storage,
}

impl BrowserStore {
    pub fn session() -> Option<Self> {
        window()
            .and_then(|w| w.session_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
    }

    pub fn local() -> Option<Self> {
        window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            warn!("Failed to write {} to browser storage", key);
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

/// Identity and idempotency state shared by the funnel pages.
#[derive(Clone)]
pub struct SessionContext {
    session: Rc<dyn KeyValueStore>,
    local: Rc<dyn KeyValueStore>,
}

impl PartialEq for SessionContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.session, &other.session) && Rc::ptr_eq(&self.local, &other.local)
    }
}

impl SessionContext {
    pub fn new(session: Rc<dyn KeyValueStore>, local: Rc<dyn KeyValueStore>) -> Self {
        Self { session, local }
    }

    /// Falls back to memory when the browser refuses storage access (private mode, sandboxed iframes).
    pub fn from_browser() -> Self {
        let session: Rc<dyn KeyValueStore> = match BrowserStore::session() {
            Some(store) => Rc::new(store),
            None => {
                warn!("sessionStorage unavailable, keeping session state in memory");
                Rc::new(MemoryStore::default())
            }
        };
        let local: Rc<dyn KeyValueStore> = match BrowserStore::local() {
            Some(store) => Rc::new(store),
            None => Rc::new(MemoryStore::default()),
        };
        Self::new(session, local)
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStore::default()), Rc::new(MemoryStore::default()))
    }

    pub fn last_user(&self) -> Option<String> {
        non_empty(self.session.get(config::LAST_USER_KEY))
    }

    pub fn set_last_user(&self, user_id: &str) {
        if !user_id.is_empty() {
            self.session.set(config::LAST_USER_KEY, user_id);
        }
    }

    pub fn last_phone(&self) -> Option<String> {
        non_empty(self.session.get(config::LAST_PHONE_KEY))
    }

    pub fn set_last_phone(&self, phone: &str) {
        if !phone.is_empty() {
            self.session.set(config::LAST_PHONE_KEY, phone);
        }
    }

    pub fn first_sms_sent(&self, user_id: &str, phone: &str) -> bool {
        self.session.get(&first_sms_key(user_id, phone)).is_some()
    }

    pub fn mark_first_sms_sent(&self, user_id: &str, phone: &str) {
        self.session.set(&first_sms_key(user_id, phone), "1");
    }

    /// Analytics correlation id, created on first use and kept across sessions.
    pub fn session_id(&self) -> String {
        if let Some(id) = non_empty(self.local.get(config::SESSION_ID_KEY)) {
            return id;
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.local.set(config::SESSION_ID_KEY, &id);
        id
    }
}

fn first_sms_key(user_id: &str, phone: &str) -> String {
    format!("{}:{}:{}", config::FIRST_SMS_KEY_PREFIX, user_id, phone)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
