use tsubo_core::model::AnswerType;

/// Bonus points awarded when the combo reaches exactly `combo`.
#[must_use]
pub fn combo_bonus(combo: u32) -> u32 {
    match combo {
        3 => 1,
        5 => 3,
        10 => 5,
        _ => 0,
    }
}

/// Consecutive-correct counter with its accumulated bonus.
///
/// The counter always runs; bonus points are only awarded when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboTracker {
    enabled: bool,
    count: u32,
    bonus_points: u32,
}

impl ComboTracker {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            count: 0,
            bonus_points: 0,
        }
    }

    /// Applies one answer and returns the bonus it earned.
    pub fn record(&mut self, answer_type: AnswerType) -> u32 {
        match answer_type {
            AnswerType::Correct => {
                self.count += 1;
                let bonus = if self.enabled { combo_bonus(self.count) } else { 0 };
                self.bonus_points += bonus;
                bonus
            }
            AnswerType::Unsure | AnswerType::Wrong => {
                self.count = 0;
                0
            }
        }
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn bonus_points(&self) -> u32 {
        self.bonus_points
    }
}
