use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use super::countdown::CountdownHandle;
use super::engine::{AnswerOutcome, GameSession, Tick};

/// Session shared between the caller and a countdown driver.
pub type SharedSession = Arc<Mutex<GameSession>>;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// How a countdown driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEnd {
    /// The countdown reached zero and forced a wrong answer.
    Expired(AnswerOutcome),
    /// The handle went stale: answered, advanced, reset or restarted.
    Stopped,
}

/// Ticks `handle` once per second until it expires or goes stale.
///
/// The lock is only held for the duration of each tick.
pub async fn run_countdown(session: SharedSession, handle: CountdownHandle) -> CountdownEnd {
    let mut ticker = interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let tick = match session.lock() {
            Ok(mut guard) => guard.tick(handle),
            Err(_) => {
                warn!(session_id = %handle.session_id(), "session lock poisoned; stopping countdown");
                return CountdownEnd::Stopped;
            }
        };
        match tick {
            Tick::Running(remaining) => {
                debug!(session_id = %handle.session_id(), remaining, "countdown tick");
            }
            Tick::Expired(outcome) => return CountdownEnd::Expired(outcome),
            Tick::Ignored => return CountdownEnd::Stopped,
        }
    }
}
