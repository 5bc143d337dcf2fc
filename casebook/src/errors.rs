// Copyright (c) The casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by casebook.

use crate::{output::OutputFormat, reporter::AnnotationDisplay};
use std::{error, io};
use thiserror::Error;

/// The error type accepted from test case bodies.
///
/// A body that returns one of these is considered broken, as opposed to
/// having detected a failure through an assertion. See
/// [`ExecutionError`] for how these surface to callers.
pub type BodyError = Box<dyn error::Error + Send + Sync>;

/// An error that occurs while registering a case under a name that is already
/// taken.
///
/// The catalog is left unchanged: the first registration under the name wins.
#[derive(Clone, Debug, Error)]
#[error("a test case named `{name}` is already registered")]
pub struct DuplicateNameError {
    name: String,
}

impl DuplicateNameError {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the name that was already registered.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An error which indicates that a case was requested but is not in the
/// catalog.
#[derive(Clone, Debug, Error)]
#[error("no test case named `{name}` in the catalog")]
pub struct CaseNotFound {
    name: String,
}

impl CaseNotFound {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the name that was looked up.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An error produced by a test case body, as opposed to an assertion failure.
///
/// An assertion failure is a normal FAIL outcome: the case detected a
/// problem in the code under test. An `ExecutionError` means the case itself
/// is broken, and is propagated rather than folded into the outcome.
#[derive(Debug, Error)]
#[error("test case `{name}` failed to execute")]
pub struct ExecutionError {
    name: String,
    #[source]
    source: BodyError,
}

impl ExecutionError {
    pub(crate) fn new(name: impl Into<String>, source: BodyError) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Returns the name of the case whose body errored.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consumes self, returning the underlying body error.
    pub fn into_source(self) -> BodyError {
        self.source
    }
}

/// An error returned while running a single named case.
#[derive(Debug, Error)]
pub enum RunError {
    /// The name was not registered in the catalog.
    #[error(transparent)]
    NotFound(#[from] CaseNotFound),

    /// The case body produced an error other than an assertion failure.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// An error that occurs while writing a catalog listing.
#[derive(Debug, Error)]
pub enum WriteCatalogError {
    /// An I/O error occurred while writing the listing.
    #[error("error writing catalog listing")]
    Io(#[from] io::Error),

    /// An error occurred while serializing the listing to JSON.
    #[error("error serializing catalog listing to JSON")]
    Json(#[from] serde_json::Error),
}

/// Error returned while parsing an [`OutputFormat`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized output format: {input}\n(known formats: {})",
    OutputFormat::variants().join(", "),
)]
pub struct OutputFormatParseError {
    input: String,
}

impl OutputFormatParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Error returned while parsing an [`AnnotationDisplay`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for annotation display: {input}\n(known values: {})",
    AnnotationDisplay::variants().join(", "),
)]
pub struct AnnotationDisplayParseError {
    input: String,
}

impl AnnotationDisplayParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}
