#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use home_core::transport::{DispatchOutcome, Transport};
use home_shared::MutationForm;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Submit(MutationForm),
    Navigate(String),
}

/// In-memory transport that answers every request with a redirect home and
/// remembers what it was sent and when.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    log: Arc<Mutex<Vec<(Request, Instant)>>>,
    fail_submits: bool,
}

impl RecordingTransport {
    pub fn failing() -> Self {
        Self {
            fail_submits: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.timed().into_iter().map(|(request, _)| request).collect()
    }

    pub fn timed(&self) -> Vec<(Request, Instant)> {
        self.log.lock().expect("recording lock").clone()
    }

    fn record(&self, request: Request) {
        self.log
            .lock()
            .expect("recording lock")
            .push((request, Instant::now()));
    }
}

impl Transport for RecordingTransport {
    async fn submit(&self, form: &MutationForm) -> anyhow::Result<DispatchOutcome> {
        self.record(Request::Submit(form.clone()));
        if self.fail_submits {
            return Err(anyhow!("connection refused"));
        }
        Ok(DispatchOutcome {
            endpoint: form.action.clone(),
            status: 302,
            location: Some("/home".to_string()),
        })
    }

    async fn navigate(&self, path: &str) -> anyhow::Result<DispatchOutcome> {
        self.record(Request::Navigate(path.to_string()));
        Ok(DispatchOutcome {
            endpoint: path.to_string(),
            status: 302,
            location: Some("/".to_string()),
        })
    }
}
