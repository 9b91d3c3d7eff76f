//! Shared fixtures for the service tests
//!
//! Every test gets a fresh `MemoryStore` and a recording mailer, so tests are
//! independent and need no database.

#![allow(dead_code)]

use std::sync::Arc;

use tasksmash_shared::mail::RecordingMailer;
use tasksmash_shared::models::account::Account;
use tasksmash_shared::services::{Services, TokenSettings};
use tasksmash_shared::store::{MemoryStore, Store};

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const BASE_URL: &str = "http://tasksmash.test";

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub services: Services,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_mailer(Arc::new(RecordingMailer::new()))
    }

    pub fn with_mailer(mailer: Arc<RecordingMailer>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let services = Services::new(dyn_store, mailer.clone(), TokenSettings::new(SECRET), BASE_URL);

        TestContext {
            store,
            mailer,
            services,
        }
    }

    /// Registers `name` with `name@example.com` and password "pw123"
    pub async fn account(&self, name: &str) -> Account {
        self.services
            .accounts
            .register(name, &format!("{}@example.com", name), "pw123")
            .await
            .expect("registration should succeed")
    }
}
