//! Fixture loading and management.

use std::path::{Path, PathBuf};

use calltest_core::{CallableDescriptor, CompareMode, Expectation, TestCall, TypeShape, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<FixtureError>,
    },
    #[error("case {case}: exactly one of `expected` or `expected_cases` must be set")]
    Expectation { case: String },
    #[error("no fixture files (*.json) in {0}")]
    Empty(PathBuf),
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Registered name of the function under test.
    pub function: String,
    /// Arguments, in parameter order.
    #[serde(default)]
    pub args: Vec<Value>,
    /// The one acceptable result sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Vec<Value>>,
    /// Several acceptable result sequences; any one may match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_cases: Option<Vec<Vec<Value>>>,
    /// Compare types only. Unset defers to the runner's default mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_only: Option<bool>,
}

impl FixtureCase {
    /// Comparison mode, falling back to `default_mode`.
    #[must_use]
    pub fn mode(&self, default_mode: CompareMode) -> CompareMode {
        self.type_only
            .map_or(default_mode, CompareMode::from_type_only)
    }

    /// The expectation as written, without coercion.
    pub fn expectation(&self) -> Result<Expectation, FixtureError> {
        match (&self.expected, &self.expected_cases) {
            (Some(expected), None) => Ok(Expectation::Single(expected.clone())),
            (None, Some(cases)) => Ok(Expectation::AnyOf(cases.clone())),
            _ => Err(FixtureError::Expectation {
                case: self.name.clone(),
            }),
        }
    }

    /// Build the engine call.
    ///
    /// With a descriptor, arguments are coerced toward the declared parameter
    /// types and expected values toward the declared return types. JSON can
    /// not spell `uint`, `float` for whole numbers, or error values, so this
    /// is how fixtures reach those types. Lists and maps are coerced element
    /// by element.
    pub fn to_test_call(
        &self,
        descriptor: Option<&CallableDescriptor>,
        default_mode: CompareMode,
    ) -> Result<TestCall, FixtureError> {
        let expectation = self.expectation()?;
        let (args, expectation) = match descriptor {
            Some(descriptor) => (
                coerce_all(&self.args, &descriptor.params),
                match expectation {
                    Expectation::Single(expected) => {
                        Expectation::Single(coerce_all(&expected, &descriptor.returns))
                    }
                    Expectation::AnyOf(cases) => Expectation::AnyOf(
                        cases
                            .iter()
                            .map(|case| coerce_all(case, &descriptor.returns))
                            .collect(),
                    ),
                },
            ),
            None => (self.args.clone(), expectation),
        };
        Ok(TestCall {
            function: self.function.clone(),
            args,
            expectation,
            mode: self.mode(default_mode),
        })
    }
}

fn coerce_all(values: &[Value], shapes: &[TypeShape]) -> Vec<Value> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match shapes.get(index) {
            Some(shape) => value.clone().coerce(shape),
            None => value.clone(),
        })
        .collect()
}

/// A collection of fixture cases for one suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Suite name, used in reports and trace ids.
    pub suite: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let load = || -> Result<Self, FixtureError> {
            let content = std::fs::read_to_string(path)?;
            Ok(Self::from_json(&content)?)
        };
        load().map_err(|source| FixtureError::File {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Load a single file, or every `*.json` file in a directory in name
    /// order.
    pub fn load_path(path: &Path) -> Result<Vec<(PathBuf, Self)>, FixtureError> {
        if !path.is_dir() {
            return Ok(vec![(path.to_path_buf(), Self::from_file(path)?)]);
        }
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(FixtureError::Empty(path.to_path_buf()));
        }
        files
            .into_iter()
            .map(|file| Self::from_file(&file).map(|set| (file, set)))
            .collect()
    }

    /// Check every case has exactly one kind of expectation.
    pub fn validate(&self) -> Result<(), FixtureError> {
        self.cases
            .iter()
            .try_for_each(|case| case.expectation().map(drop))
    }
}
