// Copyright (c) The casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test case catalog: named, annotated, executable cases in declaration
//! order.

use crate::{
    errors::{BodyError, CaseNotFound, DuplicateNameError, WriteCatalogError},
    output::OutputFormat,
};
use indexmap::{IndexMap, map::Entry};
use serde::Serialize;
use std::{fmt, io};
use termcolor::{ColorSpec, NoColor, WriteColor};

/// A test case body.
///
/// A body that runs to completion succeeded; a body that panics (for example
/// through a failed `assert!`) signaled an assertion failure; a body that
/// returns an error is itself broken and surfaces as an
/// [`ExecutionError`](crate::errors::ExecutionError).
pub type CaseBody = Box<dyn Fn() -> Result<(), BodyError> + Send + Sync>;

/// Descriptive text attached to a test case or a catalog.
///
/// The analogue of a docstring. An annotation is always non-empty:
/// "no annotation" is represented by the absence of a value, never by an
/// empty string.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Annotation {
    text: String,
}

impl Annotation {
    /// Creates a new annotation, returning `None` if the text is empty or
    /// whitespace-only.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self { text })
        }
    }

    /// Returns the first line of the annotation with trailing whitespace
    /// removed.
    ///
    /// Only the first line is significant to summary views; for a
    /// single-line annotation this is the whole text.
    pub fn first_line(&self) -> &str {
        self.text.lines().next().map(str::trim_end).unwrap_or_default()
    }

    /// Returns the verbatim annotation text, preserving all lines exactly as
    /// registered.
    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// Returns true if the annotation spans more than one line.
    pub fn is_multi_line(&self) -> bool {
        self.text.lines().nth(1).is_some()
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.text)
    }
}

/// A single registered test case.
pub struct TestCase {
    name: String,
    annotation: Option<Annotation>,
    body: CaseBody,
}

impl TestCase {
    /// Returns the name of this case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the annotation attached to this case, if any.
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    pub(crate) fn body(&self) -> &CaseBody {
        &self.body
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("annotation", &self.annotation)
            .field("body", &"Box<dyn Fn() -> Result<(), BodyError>>")
            .finish()
    }
}

/// An ordered collection of named test cases.
///
/// Cases are stored in declaration (registration) order, and that order is
/// significant: [`run_all`](Self::run_all) executes and yields results in
/// exactly this order. Names are unique within a catalog.
///
/// Registration is a distinct phase: a catalog is populated once, then
/// executed through `&self` any number of times.
#[derive(Debug, Default)]
pub struct TestCaseCatalog {
    annotation: Option<Annotation>,
    cases: IndexMap<String, TestCase>,
}

impl TestCaseCatalog {
    /// Creates a new, empty catalog with no catalog-level annotation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty catalog with the given catalog-level annotation
    /// (a suite description).
    pub fn with_annotation(annotation: Annotation) -> Self {
        Self {
            annotation: Some(annotation),
            cases: IndexMap::new(),
        }
    }

    /// Registers a new case at the end of the catalog.
    ///
    /// Returns a [`DuplicateNameError`] if a case with this name is already
    /// registered; in that event the catalog is unchanged and the existing
    /// case is kept.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        annotation: Option<Annotation>,
        body: impl Fn() -> Result<(), BodyError> + Send + Sync + 'static,
    ) -> Result<(), DuplicateNameError> {
        match self.cases.entry(name.into()) {
            Entry::Occupied(entry) => Err(DuplicateNameError::new(entry.key())),
            Entry::Vacant(entry) => {
                let case = TestCase {
                    name: entry.key().clone(),
                    annotation,
                    body: Box::new(body),
                };
                entry.insert(case);
                Ok(())
            }
        }
    }

    /// Returns the annotation of the named case.
    ///
    /// `Ok(None)` indicates the case exists but carries no annotation. This
    /// is always distinguishable from a present annotation, which is
    /// guaranteed non-empty.
    pub fn annotation_of(&self, name: &str) -> Result<Option<&Annotation>, CaseNotFound> {
        self.cases
            .get(name)
            .map(TestCase::annotation)
            .ok_or_else(|| CaseNotFound::new(name))
    }

    /// Returns the named case, or `None` if it isn't registered.
    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.cases.get(name)
    }

    /// Returns the catalog-level annotation, if any.
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// Returns the number of registered cases.
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Returns true if no cases are registered.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Iterates over the cases in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TestCase> + '_ {
        self.cases.values()
    }

    /// Writes a listing of this catalog to the given writer.
    ///
    /// The listing covers names and annotations only; outcomes are produced
    /// by the [`runner`](crate::runner) and rendered by the
    /// [`reporter`](crate::reporter).
    pub fn write(
        &self,
        output_format: OutputFormat,
        mut writer: impl WriteColor,
    ) -> Result<(), WriteCatalogError> {
        match output_format {
            OutputFormat::Plain => Ok(self.write_plain(&mut writer)?),
            OutputFormat::Serializable(format) => format.to_writer(&self.summary(), writer),
        }
    }

    /// Returns the listing as a string in the given format.
    pub fn to_string(&self, output_format: OutputFormat) -> Result<String, WriteCatalogError> {
        let mut buf = NoColor::new(vec![]);
        self.write(output_format, &mut buf)?;
        Ok(String::from_utf8(buf.into_inner()).expect("buffer is valid UTF-8"))
    }

    // ---
    // Helper methods
    // ---

    fn write_plain(&self, mut writer: impl WriteColor) -> io::Result<()> {
        if let Some(annotation) = &self.annotation {
            writer.set_color(&catalog_spec())?;
            write!(writer, "{}", annotation.first_line())?;
            writer.reset()?;
            writeln!(writer, ":")?;
        }

        for case in self.cases.values() {
            writer.set_color(&case_name_spec())?;
            write!(writer, "    {}", case.name())?;
            writer.reset()?;
            match case.annotation() {
                Some(annotation) => writeln!(writer, ": {}", annotation.first_line())?,
                None => writeln!(writer)?,
            }
        }
        Ok(())
    }

    fn summary(&self) -> CatalogSummary<'_> {
        let cases = self
            .cases
            .values()
            .map(|case| {
                (
                    case.name(),
                    CaseSummary {
                        annotation: case.annotation().map(Annotation::full_text),
                        summary: case.annotation().map(Annotation::first_line),
                    },
                )
            })
            .collect();
        CatalogSummary {
            case_count: self.cases.len(),
            annotation: self.annotation.as_ref().map(Annotation::full_text),
            cases,
        }
    }
}

/// Serializable view of a catalog. Bodies are not serializable, so the view
/// covers names and annotations only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct CatalogSummary<'a> {
    case_count: usize,
    annotation: Option<&'a str>,
    cases: IndexMap<&'a str, CaseSummary<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct CaseSummary<'a> {
    /// The full annotation text, preserved verbatim.
    annotation: Option<&'a str>,
    /// The first line of the annotation.
    summary: Option<&'a str>,
}

pub(crate) fn catalog_spec() -> ColorSpec {
    let mut color_spec = ColorSpec::new();
    color_spec
        .set_fg(Some(termcolor::Color::Magenta))
        .set_bold(true);
    color_spec
}

pub(crate) fn case_name_spec() -> ColorSpec {
    let mut color_spec = ColorSpec::new();
    color_spec
        .set_fg(Some(termcolor::Color::Blue))
        .set_bold(true);
    color_spec
}
