//! Error monitoring integration.
//!
//! Error-level records are forwarded to an [`ErrorMonitor`] in addition to
//! being written to the log. [`RollbarMonitor`] delivers them to the Rollbar
//! item API from a background thread so logging never waits on the network.

use std::error::Error;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use error_common::error_chain;
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{LogError, Result};
use crate::fields;
use crate::level::Level;
use crate::version::git_version;
use crate::writer::Event;

/// Rollbar item endpoint.
pub const ROLLBAR_ENDPOINT: &str = "https://api.rollbar.com/api/1/item/";

pub trait ErrorMonitor: Send + Sync {
    /// Report an error. Delivery failures are never surfaced to the caller.
    fn notify(&self, level: Level, err: &(dyn Error + 'static), fields: &Event);

    /// Deliver pending reports and stop accepting new ones. Calling it more
    /// than once has no effect.
    fn close(&self);
}

/// Reports errors to Rollbar.
pub struct RollbarMonitor {
    token: String,
    environment: String,
    sender: Mutex<Option<Sender<Value>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RollbarMonitor {
    /// # Errors
    ///
    /// Fails when the delivery thread cannot be started.
    pub fn new(token: &str, environment: &str) -> Result<Self> {
        Self::with_endpoint(ROLLBAR_ENDPOINT, token, environment)
    }

    /// # Errors
    ///
    /// Fails when the delivery thread cannot be started.
    pub fn with_endpoint(endpoint: &str, token: &str, environment: &str) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Value>();
        let endpoint = endpoint.to_string();

        // The blocking client owns a runtime and must be created and dropped
        // outside of any async context, so it lives on the worker thread.
        let worker = thread::Builder::new()
            .name("rollbar-monitor".to_string())
            .spawn(move || {
                let client = match reqwest::blocking::Client::builder()
                    .timeout(Duration::from_secs(30))
                    .build()
                {
                    Ok(client) => client,
                    Err(err) => {
                        tracing::warn!(error = %err, "building error monitor client failed");
                        return;
                    }
                };

                for item in receiver {
                    let response = client
                        .post(&endpoint)
                        .json(&item)
                        .send()
                        .and_then(reqwest::blocking::Response::error_for_status);
                    if let Err(err) = response {
                        tracing::warn!(error = %err, "sending item to error monitor failed");
                    }
                }
            })
            .map_err(LogError::Monitor)?;

        Ok(Self {
            token: token.to_string(),
            environment: environment.to_string(),
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Build the item payload sent for `err`.
    pub fn item(&self, level: Level, err: &(dyn Error + 'static), fields: &Event) -> Value {
        let mut data = json!({
            "environment": self.environment,
            "level": level.monitor_level(),
            "timestamp": Utc::now().timestamp(),
            "code_version": git_version(),
            "platform": std::env::consts::OS,
            "language": "rust",
            "body": {
                "message": {
                    "body": error_chain(err),
                },
            },
            "custom": fields,
            "notifier": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        if let (Some(uuid), Some(data)) = (item_uuid(fields), data.as_object_mut()) {
            data.insert("uuid".to_string(), Value::String(uuid));
        }

        json!({
            "access_token": self.token,
            "data": data,
        })
    }
}

impl ErrorMonitor for RollbarMonitor {
    fn notify(&self, level: Level, err: &(dyn Error + 'static), fields: &Event) {
        let item = self.item(level, err, fields);
        let sent = self
            .sender
            .lock()
            .as_ref()
            .is_some_and(|sender| sender.send(item).is_ok());

        if !sent {
            tracing::warn!("error monitor is closed, dropping report");
        }
    }

    fn close(&self) {
        // Dropping the sender ends the worker loop once the queue is drained.
        self.sender.lock().take();

        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::warn!("error monitor worker panicked");
            }
        }
    }
}

impl Drop for RollbarMonitor {
    fn drop(&mut self) {
        self.close();
    }
}

/// The request ID doubles as the item UUID when it is a v4 UUID.
fn item_uuid(extra: &Event) -> Option<String> {
    let request_id = extra.get(fields::REQUEST_ID)?.as_str()?;
    let uuid = Uuid::parse_str(request_id).ok()?;

    (uuid.get_version() == Some(uuid::Version::Random)).then(|| request_id.to_string())
}
