mod countdown;
mod driver;
mod engine;
#[cfg(test)]
mod fixtures;
mod pool;
mod question;
mod scoring;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use countdown::CountdownHandle;
pub use driver::{CountdownEnd, SharedSession, run_countdown};
pub use engine::{Advance, AnswerOutcome, EngineSettings, GameSession, Tick};
pub use pool::derive_pool;
pub use question::generate_question;
pub use scoring::{ComboTracker, combo_bonus};
pub use view::{SessionPhase, SessionSnapshot};
pub use workflow::{FinishedGame, QuizLoopService, StartedSession};
