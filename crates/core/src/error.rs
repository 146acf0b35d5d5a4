use thiserror::Error;

use crate::model::{CatalogError, ItemError, QuestionError, SettingsError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Catalog, TimeAttackSeconds};

    #[test]
    fn domain_errors_convert_with_question_mark() {
        fn load(raw: &str) -> Result<Catalog, Error> {
            Ok(Catalog::from_json(raw)?)
        }
        fn seconds(raw: u32) -> Result<TimeAttackSeconds, Error> {
            Ok(TimeAttackSeconds::try_from(raw)?)
        }

        assert!(matches!(load("[]"), Err(Error::Catalog(_))));
        assert!(matches!(seconds(4), Err(Error::Settings(_))));
        assert_eq!(
            seconds(4).unwrap_err().to_string(),
            "time attack limit must be one of 3, 5, 8 or 10 seconds, got 4"
        );
    }
}
