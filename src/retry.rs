//! Retry decisions for transient cache and execute failures.
//!
//! BA callbacks call `start_*` when the engine begins an attempt and `end_*`
//! when it completes; the `end_*` result says whether to ask the engine to
//! retry. Three slots are tracked independently: the cache container (or
//! package), the cache payload, and the executing package.
//!
//! A slot counts consecutive attempts on the same id. Starting an attempt on
//! the id already in the slot bumps the count and waits the configured delay
//! first; a different id starts a fresh count.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use std::time::Duration;
//! use bawire::retry::RetryPolicy;
//! use bawire::status::Status;
//!
//! let mut policy = RetryPolicy::new(2, Duration::ZERO);
//! policy.start_execute_attempt(Some("pkg")).await;
//! assert!(policy.end_execute_attempt(Some("pkg"), Status(0x8007_0652)));
//! # }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Default number of retries per id.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wait before a retried attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Cache results that are never retried.
const CACHE_NO_RETRY: [Status; 4] = [
    Status(0x8007_0642), // user exit
    Status(0x8007_2F83), // internet disconnected
    Status(0x8007_0002), // file not found
    Status(0x8007_2EE7), // name not resolved
];

/// ERROR_INSTALL_SERVICE_FAILURE
const INSTALL_SERVICE_FAILURE: Status = Status(0x8007_0641);
/// ERROR_INSTALL_ALREADY_RUNNING
const INSTALL_ALREADY_RUNNING: Status = Status(0x8007_0652);
/// ERROR_INSTALL_FAILURE
const INSTALL_FAILURE: Status = Status(0x8007_0643);

/// Windows Installer error codes that usually clear up on a second try.
fn is_transient_installer_error(status: Status) -> bool {
    (1303..=1307)
        .chain(1309..=1322)
        .chain([1335, 1336, 1401, 1402, 1404, 1406])
        .any(|code| Status::from_win32(code) == status)
}

/// Retry settings, as found in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Attempt tracking for one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryEntry {
    pub id: Option<String>,
    pub retry_count: u32,
    pub last_error: Status,
}

impl RetryEntry {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn holds(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

fn present(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
}

async fn start_attempt(entry: &mut RetryEntry, id: Option<&str>, delay: Duration) {
    match present(id) {
        None => entry.clear(),
        Some(id) if entry.holds(id) => {
            entry.retry_count += 1;
            tracing::debug!(id, retry_count = entry.retry_count, "retrying attempt");
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Some(id) => {
            entry.id = Some(id.to_string());
            entry.retry_count = 0;
        }
    }
    entry.last_error = Status::OK;
}

/// Whether a failed attempt is still eligible for a retry at all.
fn may_retry(entry: &mut RetryEntry, id: Option<&str>, result: Status, max_retries: u32) -> bool {
    let Some(id) = present(id) else {
        entry.clear();
        return false;
    };

    result.is_failure() && entry.retry_count < max_retries && entry.holds(id)
}

/// Retry state for one BA.
///
/// The policy is a plain value; share it between tasks behind a lock.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
    container: RetryEntry,
    payload: RetryEntry,
    execute: RetryEntry,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            container: RetryEntry::default(),
            payload: RetryEntry::default(),
            execute: RetryEntry::default(),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.delay())
    }

    /// Set the limits and forget every slot.
    pub fn initialize(&mut self, max_retries: u32, delay: Duration) {
        *self = Self::new(max_retries, delay);
    }

    /// Forget every slot.
    pub fn uninitialize(&mut self) {
        self.container.clear();
        self.payload.clear();
        self.execute.clear();
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn cache_container(&self) -> &RetryEntry {
        &self.container
    }

    pub fn cache_payload(&self) -> &RetryEntry {
        &self.payload
    }

    pub fn execute(&self) -> &RetryEntry {
        &self.execute
    }

    /// Note the start of a cache attempt.
    ///
    /// With no ids both cache slots are cleared. Without a payload id the
    /// container slot tracks `container_or_package_id`.
    pub async fn start_cache_attempt(
        &mut self,
        container_or_package_id: Option<&str>,
        payload_id: Option<&str>,
    ) {
        match (container_or_package_id, payload_id) {
            (None, None) => {
                self.container.clear();
                self.payload.clear();
            }
            (id, None) => start_attempt(&mut self.container, id, self.delay).await,
            (_, id) => start_attempt(&mut self.payload, id, self.delay).await,
        }
    }

    /// Note the start of a package execution.
    pub async fn start_execute_attempt(&mut self, package_id: Option<&str>) {
        start_attempt(&mut self.execute, package_id, self.delay).await;
    }

    /// Remember the installer error reported while `package_id` executes.
    pub fn record_execute_error(&mut self, package_id: Option<&str>, win32_code: u32) {
        if let Some(id) = present(package_id) {
            if self.execute.holds(id) {
                self.execute.last_error = Status::from_win32(win32_code);
            }
        }
    }

    /// Decide whether a finished cache attempt should be retried.
    pub fn end_cache_attempt(
        &mut self,
        container_or_package_id: Option<&str>,
        payload_id: Option<&str>,
        result: Status,
    ) -> bool {
        let max_retries = self.max_retries;
        let eligible = match (container_or_package_id, payload_id) {
            (None, None) => {
                self.container.clear();
                self.payload.clear();
                false
            }
            (id, None) => may_retry(&mut self.container, id, result, max_retries),
            (_, id) => may_retry(&mut self.payload, id, result, max_retries),
        };

        let retry = eligible && !CACHE_NO_RETRY.contains(&result);
        tracing::debug!(%result, retry, "cache attempt complete");
        retry
    }

    /// Decide whether a finished package execution should be retried.
    pub fn end_execute_attempt(&mut self, package_id: Option<&str>, result: Status) -> bool {
        if !may_retry(&mut self.execute, package_id, result, self.max_retries) {
            return false;
        }

        let retry = match result {
            INSTALL_SERVICE_FAILURE | INSTALL_ALREADY_RUNNING => true,
            INSTALL_FAILURE => is_transient_installer_error(self.execute.last_error),
            _ => false,
        };
        tracing::debug!(%result, last_error = %self.execute.last_error, retry, "execute attempt complete");
        retry
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
