//! Build errors for tables, transitions and machines.
//!
//! Builders check every required field and report all missing ones at
//! once instead of stopping at the first.

use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single problem found while building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Transition table not specified. Call .table(table) before .build()")]
    MissingTable,

    #[error("Initial phase not specified. Call .initial(phase) before .build()")]
    MissingInitialPhase,

    #[error("Initial payload not specified. Call .payload(value) before .build()")]
    MissingPayload,

    #[error("Reducer not specified. Call .reducer(reducer) before .build()")]
    MissingReducer,

    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition source phase not specified. Call .from(phase)")]
    MissingFromPhase,

    #[error("Transition target phase not specified. Call .to(phase)")]
    MissingToPhase,

    #[error("Transition selector not specified. Call .via(tag)")]
    MissingSelector,
}

/// Every problem found by one `build` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render(.0))]
pub struct BuildErrors(pub Vec<BuildError>);

fn render(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BuildErrors {
    pub(crate) fn accumulate(checks: Vec<Validation<(), NonEmptyVec<BuildError>>>) -> Self {
        match Validation::all_vec(checks) {
            Validation::Success(_) => BuildErrors(Vec::new()),
            Validation::Failure(errors) => BuildErrors(errors.iter().cloned().collect()),
        }
    }

    pub fn contains(&self, error: &BuildError) -> bool {
        self.0.contains(error)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BuildError> for BuildErrors {
    fn from(error: BuildError) -> Self {
        BuildErrors(vec![error])
    }
}

pub(crate) fn require<X>(
    value: &Option<X>,
    missing: BuildError,
) -> Validation<(), NonEmptyVec<BuildError>> {
    if value.is_some() {
        Validation::success(())
    } else {
        Validation::fail(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_every_failure() {
        let missing: Option<u8> = None;
        let present = Some(1u8);
        let errors = BuildErrors::accumulate(vec![
            require(&missing, BuildError::MissingFromPhase),
            require(&present, BuildError::MissingToPhase),
            require(&missing, BuildError::MissingSelector),
        ]);

        assert_eq!(
            errors,
            BuildErrors(vec![BuildError::MissingFromPhase, BuildError::MissingSelector])
        );
    }

    #[test]
    fn passing_checks_produce_no_errors() {
        let present = Some(());
        let errors = BuildErrors::accumulate(vec![require(&present, BuildError::MissingTable)]);
        assert!(errors.is_empty());
    }

    #[test]
    fn renders_all_messages() {
        let errors = BuildErrors(vec![BuildError::MissingTable, BuildError::MissingReducer]);
        let message = errors.to_string();
        assert!(message.contains(".table(table)"));
        assert!(message.contains(".reducer(reducer)"));
    }
}
