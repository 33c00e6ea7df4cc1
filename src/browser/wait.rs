//! Bounded waits: poll a [`PageSession`] until a condition holds or a deadline
//! passes. Reaching the deadline means "not found", never an error; only
//! failures of the session itself are returned as `Err`.

use super::{ElementHandle, PageSession};
use crate::error::Result;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Stands in for an unbounded deadline when `now + timeout` overflows.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    timeout: Duration,
    poll_interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// First element matching `css`, if one shows up before the deadline.
    pub async fn until_present<S: PageSession>(
        &self,
        session: &mut S,
        css: &str,
    ) -> Result<Option<ElementHandle>> {
        Ok(self.until_all_present(session, css).await?.into_iter().next())
    }

    /// Every element matching `css` at the first poll that finds at least one.
    pub async fn until_all_present<S: PageSession>(
        &self,
        session: &mut S,
        css: &str,
    ) -> Result<Vec<ElementHandle>> {
        let deadline = self.deadline();
        loop {
            let found = session.find_all(css).await?;
            if !found.is_empty() {
                return Ok(found);
            }
            if !self.pause_until(deadline).await {
                debug!(css, timeout = ?self.timeout, "Wait timed out");
                return Ok(Vec::new());
            }
        }
    }

    /// First element matching `css` that is displayed and enabled.
    pub async fn until_clickable<S: PageSession>(
        &self,
        session: &mut S,
        css: &str,
    ) -> Result<Option<ElementHandle>> {
        let deadline = self.deadline();
        loop {
            for element in session.find_all(css).await? {
                if session.is_clickable(&element).await? {
                    return Ok(Some(element));
                }
            }
            if !self.pause_until(deadline).await {
                debug!(css, timeout = ?self.timeout, "Wait for clickable timed out");
                return Ok(None);
            }
        }
    }

    fn deadline(&self) -> Instant {
        let now = Instant::now();
        now.checked_add(self.timeout).unwrap_or_else(|| now + FAR_FUTURE)
    }

    /// Sleep one poll interval, clipped to the deadline. False once the
    /// deadline has passed.
    async fn pause_until(&self, deadline: Instant) -> bool {
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep(self.poll_interval.min(deadline - now)).await;
        true
    }
}
