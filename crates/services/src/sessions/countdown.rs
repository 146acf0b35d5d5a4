use tsubo_core::model::SessionId;

/// Proof of one arming of a session's countdown.
///
/// Re-arming, cancelling, resetting or starting another session makes older handles stale;
/// ticks through a stale handle are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownHandle {
    session: SessionId,
    generation: u64,
}

impl CountdownHandle {
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session
    }
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CountdownTick {
    Stale,
    Running(u32),
    Expired,
}

/// Per-question countdown owned by a running game. At most one arming is live.
#[derive(Debug, Clone)]
pub(crate) struct Countdown {
    session: SessionId,
    limit_secs: Option<u32>,
    remaining: Option<u32>,
    generation: u64,
    armed: bool,
}

impl Countdown {
    /// A `None` or zero limit disables the countdown.
    pub(crate) fn new(session: SessionId, limit_secs: Option<u32>) -> Self {
        Self {
            session,
            limit_secs: limit_secs.filter(|secs| *secs > 0),
            remaining: None,
            generation: 0,
            armed: false,
        }
    }

    /// Cancels any live arming and starts a fresh one at the full limit.
    pub(crate) fn arm(&mut self) -> Option<CountdownHandle> {
        self.cancel();
        let limit = self.limit_secs?;
        self.remaining = Some(limit);
        self.armed = true;
        Some(CountdownHandle {
            session: self.session,
            generation: self.generation,
        })
    }

    /// Stops the live arming; the remaining time stays visible.
    pub(crate) fn cancel(&mut self) {
        self.generation += 1;
        self.armed = false;
    }

    pub(crate) fn tick(&mut self, handle: CountdownHandle) -> CountdownTick {
        if !self.armed || handle.session != self.session || handle.generation != self.generation {
            return CountdownTick::Stale;
        }
        let Some(remaining) = self.remaining else {
            return CountdownTick::Stale;
        };

        let remaining = remaining.saturating_sub(1);
        self.remaining = Some(remaining);
        if remaining == 0 {
            self.armed = false;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(remaining)
        }
    }

    pub(crate) fn handle(&self) -> Option<CountdownHandle> {
        self.armed.then_some(CountdownHandle {
            session: self.session,
            generation: self.generation,
        })
    }

    pub(crate) fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.limit_secs.is_some()
    }
}
