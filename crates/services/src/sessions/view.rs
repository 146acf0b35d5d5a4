use tsubo_core::model::{AnswerType, Question, SessionConfig, SessionId};

/// Where the session sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session started, or reset.
    Idle,
    /// A question is waiting for an answer.
    Active,
    /// The current question is answered and its reveal is showing.
    Resolved,
    Finished,
}

/// Presentation-agnostic projection of the session state.
///
/// After a survival run ends on a wrong answer the phase is `Finished`, while
/// `question`, `selected_answer` and `current_answer_type` still describe the
/// final reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot<'a> {
    pub phase: SessionPhase,
    pub session_id: Option<SessionId>,
    pub config: Option<&'a SessionConfig>,
    pub question: Option<&'a Question>,
    pub question_index: usize,
    /// Fixed list length, or questions presented so far in survival mode.
    pub total_questions: usize,
    pub score: u32,
    pub correct_count: usize,
    pub unsure_count: usize,
    pub wrong_count: usize,
    /// `Some(None)` marks an answer forced by the countdown.
    pub selected_answer: Option<Option<usize>>,
    pub current_answer_type: Option<AnswerType>,
    pub show_result: bool,
    pub time_remaining: Option<u32>,
    pub is_time_out: bool,
    pub combo_count: u32,
    pub bonus_points: u32,
    pub survival_count: usize,
}

impl SessionSnapshot<'_> {
    pub(crate) fn idle() -> Self {
        Self {
            phase: SessionPhase::Idle,
            session_id: None,
            config: None,
            question: None,
            question_index: 0,
            total_questions: 0,
            score: 0,
            correct_count: 0,
            unsure_count: 0,
            wrong_count: 0,
            selected_answer: None,
            current_answer_type: None,
            show_result: false,
            time_remaining: None,
            is_time_out: false,
            combo_count: 0,
            bonus_points: 0,
            survival_count: 0,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.phase, SessionPhase::Active | SessionPhase::Resolved)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }
}
