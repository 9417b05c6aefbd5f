//! Refresh controller: fetch → normalize, with bounded retry.
//!
//! The browser-era design this replaces kept a detached 10-second retry timer
//! that was never cancelled, so a manual refresh could race a pending retry.
//! Here the retry is owned by the call: `refresh_with_retry` sleeps and
//! retries inline, and returns when it either has data or has exhausted its
//! attempts. No timer outlives the call, so a new manual refresh can never
//! overlap a stale one.
//!
//! The sleep is injected so tests can record scheduled delays instead of
//! actually waiting.

use std::time::Duration;

use crate::api::{FetchError, MonitorClient};
use crate::model::{self, RawStatusRecord, TerminalStatus};

/// Anything that can produce a raw status payload. The production impl is
/// [`MonitorClient`]; tests hand in scripted fakes.
pub trait StatusSource {
    fn fetch_status(&self) -> Result<Vec<RawStatusRecord>, FetchError>;
}

impl StatusSource for MonitorClient {
    fn fetch_status(&self) -> Result<Vec<RawStatusRecord>, FetchError> {
        MonitorClient::fetch_status(self)
    }
}

/// Outcome of one refresh cycle, including how often it had to retry.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub result: Result<Vec<TerminalStatus>, FetchError>,
    /// Retries performed (0 when the first attempt succeeded).
    pub retries: u32,
}

/// Drives fetch/normalize cycles against a [`StatusSource`].
pub struct Refresher<S> {
    source: S,
    retry_delay: Duration,
    retry_attempts: u32,
}

impl<S: StatusSource> Refresher<S> {
    pub fn new(source: S, retry_delay: Duration, retry_attempts: u32) -> Self {
        Self {
            source,
            retry_delay,
            retry_attempts,
        }
    }

    /// Single fetch → normalize cycle, no retry.
    pub fn refresh(&self) -> Result<Vec<TerminalStatus>, FetchError> {
        self.source.fetch_status().map(model::normalize_all)
    }

    /// Fetch with retry: on failure, invoke the sleep hook with the error
    /// and the fixed delay, then try again, up to the configured attempt
    /// count. The last error wins when every attempt fails.
    pub fn refresh_with_retry<F>(&self, mut sleep: F) -> RefreshOutcome
    where
        F: FnMut(&FetchError, Duration),
    {
        let mut retries = 0;
        loop {
            match self.refresh() {
                Ok(records) => {
                    return RefreshOutcome {
                        result: Ok(records),
                        retries,
                    };
                }
                Err(err) if retries < self.retry_attempts => {
                    sleep(&err, self.retry_delay);
                    retries += 1;
                }
                Err(err) => {
                    return RefreshOutcome {
                        result: Err(err),
                        retries,
                    };
                }
            }
        }
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
