//! Clock and navigator adapters

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::ports::{Clock, Navigator};

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Navigator that remembers the current view and every login redirect
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    current: Mutex<Option<String>>,
    login_redirects: Mutex<Vec<Option<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the user is now looking at `url`
    pub fn visit(&self, url: impl Into<String>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(url.into());
    }

    /// Return URLs of all login redirects so far, oldest first
    pub fn login_redirects(&self) -> Vec<Option<String>> {
        self.login_redirects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Take the redirects recorded since the last call
    pub fn take_login_redirects(&self) -> Vec<Option<String>> {
        std::mem::take(&mut *self.login_redirects.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Navigator for RecordingNavigator {
    fn current_url(&self) -> Option<String> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn to_login(&self, return_url: Option<&str>) {
        self.login_redirects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(return_url.map(str::to_string));
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(crate::services::routes::AUTH.to_string());
    }
}
