use serde::{Deserialize, Serialize};

/// A title earned by accumulating correct answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub id: &'static str,
    pub name: &'static str,
    pub required_correct: u32,
    pub emoji: &'static str,
}

/// The rank ladder, ordered by `required_correct`.
pub static RANKS: [Rank; 10] = [
    Rank { id: "beginner", name: "見習い", required_correct: 0, emoji: "🌱" },
    Rank { id: "eta_tsubonin", name: "えたつぼにん", required_correct: 10, emoji: "👤" },
    Rank { id: "tsubo_hyakusho", name: "つぼ百姓", required_correct: 50, emoji: "🌾" },
    Rank { id: "tsubo_shonin", name: "つぼ商人", required_correct: 100, emoji: "💼" },
    Rank { id: "tsubo_musume", name: "つぼ娘", required_correct: 150, emoji: "👧" },
    Rank { id: "tsubo_jochu", name: "つぼ女中", required_correct: 200, emoji: "👩" },
    Rank { id: "tsubo_hime", name: "つぼ姫", required_correct: 250, emoji: "👸" },
    Rank { id: "tsubo_okata", name: "つぼのお方", required_correct: 300, emoji: "👑" },
    Rank { id: "tsubo_gozen", name: "つぼ御前", required_correct: 350, emoji: "🏯" },
    Rank { id: "tsubomi_san", name: "つぼみさん", required_correct: 361, emoji: "🌸" },
];

/// Highest rank whose requirement `total_correct` meets.
#[must_use]
pub fn rank_for(total_correct: u32) -> &'static Rank {
    RANKS
        .iter()
        .rev()
        .find(|rank| total_correct >= rank.required_correct)
        .unwrap_or(&RANKS[0])
}

/// Outcome of crediting correct answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankChange {
    pub previous: &'static Rank,
    /// Set only when the credit moved the player to a new rank.
    pub new_rank: Option<&'static Rank>,
}

/// Persisted lifetime counter behind the rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankProgress {
    pub total_correct: u32,
    pub current_rank_id: String,
}

impl Default for RankProgress {
    fn default() -> Self {
        Self {
            total_correct: 0,
            current_rank_id: RANKS[0].id.to_owned(),
        }
    }
}

impl RankProgress {
    fn current_index(&self) -> usize {
        RANKS
            .iter()
            .position(|rank| rank.id == self.current_rank_id)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn current_rank(&self) -> &'static Rank {
        &RANKS[self.current_index()]
    }

    #[must_use]
    pub fn next_rank(&self) -> Option<&'static Rank> {
        RANKS.get(self.current_index() + 1)
    }

    #[must_use]
    pub fn correct_to_next_rank(&self) -> u32 {
        self.next_rank()
            .map_or(0, |next| next.required_correct.saturating_sub(self.total_correct))
    }

    /// Progress from the current rank's threshold to the next one, clamped to 0..=100.
    #[must_use]
    pub fn progress_to_next_rank(&self) -> f64 {
        let Some(next) = self.next_rank() else {
            return 100.0;
        };
        let floor = f64::from(self.current_rank().required_correct);
        let range = f64::from(next.required_correct) - floor;
        let done = f64::from(self.total_correct) - floor;
        (done / range * 100.0).clamp(0.0, 100.0)
    }

    /// Credits `count` correct answers and recomputes the rank.
    pub fn add_correct(&mut self, count: u32) -> RankChange {
        let previous = self.current_rank();
        self.total_correct = self.total_correct.saturating_add(count);
        let rank = rank_for(self.total_correct);
        self.current_rank_id = rank.id.to_owned();

        RankChange {
            previous,
            new_rank: (rank.id != previous.id).then_some(rank),
        }
    }
}
