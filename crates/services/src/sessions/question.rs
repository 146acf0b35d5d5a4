use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use tsubo_core::model::{Catalog, Item, OPTION_COUNT, Question, QuestionError};

const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// Builds a four-option question for `target`, drawing distractors from the whole catalog.
///
/// Distractor names are not compared with the target name, so a catalog with duplicate
/// names can show the same text twice; the correct slot is still tracked by identity.
///
/// # Errors
///
/// Returns `QuestionError::OptionCount` if the catalog holds fewer than three other items.
pub fn generate_question<R: Rng + ?Sized>(
    target: &Item,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<Question, QuestionError> {
    let mut others: Vec<&Item> = catalog.iter().filter(|i| i.id() != target.id()).collect();
    others.shuffle(rng);

    let mut options: Vec<(&str, bool)> = Vec::with_capacity(OPTION_COUNT);
    options.push((target.name(), true));
    options.extend(
        others
            .into_iter()
            .take(DISTRACTOR_COUNT)
            .map(|item| (item.name(), false)),
    );
    options.shuffle(rng);

    let correct_index = options
        .iter()
        .position(|(_, is_target)| *is_target)
        .unwrap_or_default();
    let names = options.into_iter().map(|(name, _)| name.to_owned()).collect();

    Question::new(target.clone(), names, correct_index)
}

/// Draws `count` distinct items uniformly without replacement (shuffle, then truncate).
pub fn draw_distinct<R: Rng + ?Sized>(mut pool: Vec<Item>, count: usize, rng: &mut R) -> Vec<Item> {
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

/// Picks one item uniformly; repeated calls sample with replacement.
pub fn sample_one<'a, R: Rng + ?Sized>(pool: &'a [Item], rng: &mut R) -> Option<&'a Item> {
    pool.choose(rng)
}
