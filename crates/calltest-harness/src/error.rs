use thiserror::Error;

use crate::fixtures::FixtureError;

/// Errors that stop a fixture run. Failed comparisons are verdicts, not errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error("log: {0}")]
    Log(#[from] std::io::Error),
}
