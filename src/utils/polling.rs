use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

/// How a bounded wait ended, with the number of checks performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts } | PollOutcome::TimedOut { attempts } => *attempts,
        }
    }
}

/// Calls `check` every `poll_interval` until it yields `Ok(true)` or
/// `max_wait` has elapsed.
///
/// A failing check is logged and counted as not ready; it never ends the
/// wait early. The first check runs immediately. A `max_wait` too large to
/// add to the current instant means the wait has no deadline.
pub async fn poll_until<F, Fut, E>(
    check: F,
    max_wait: Duration,
    poll_interval: Duration,
    operation_name: &str,
) -> PollOutcome
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Display,
{
    let deadline = Instant::now().checked_add(max_wait);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match check().await {
            Ok(true) => {
                debug!("{} ready after {} checks", operation_name, attempts);
                return PollOutcome::Ready { attempts };
            }
            Ok(false) => {}
            Err(e) => warn!("{} check #{} failed: {}", operation_name, attempts, e),
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            warn!(
                "{} not ready after {:?} ({} checks)",
                operation_name, max_wait, attempts
            );
            return PollOutcome::TimedOut { attempts };
        }

        tokio::time::sleep(poll_interval).await;
    }
}
