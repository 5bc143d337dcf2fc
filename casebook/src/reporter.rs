// Copyright (c) The casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering catalog runs to a terminal.

use crate::{
    catalog::{Annotation, TestCaseCatalog, case_name_spec, catalog_spec},
    errors::{AnnotationDisplayParseError, ExecutionError},
    runner::{CaseRunStatus, CaseStatus, RunStats},
};
use std::{error::Error, fmt, io, str::FromStr, time::Instant};
use termcolor::{ColorChoice, ColorSpec, WriteColor};

/// When to color terminal output.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Color {
    /// Always color output.
    Always,

    /// Color output if the stream is a terminal.
    #[default]
    Auto,

    /// Never color output.
    Never,
}

impl Color {
    /// Returns the color choice for the given stream.
    pub fn color_choice(self, stream: atty::Stream) -> ColorChoice {
        // https://docs.rs/termcolor/1.1.2/termcolor/index.html#detecting-presence-of-a-terminal
        match self {
            Color::Always => ColorChoice::Always,
            Color::Auto => {
                if atty::is(stream) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                }
            }
            Color::Never => ColorChoice::Never,
        }
    }
}

/// How much of a case's annotation a summary line shows.
///
/// Lines past the first carry no semantics and are supplementary detail, so
/// summaries default to the first line only. The full text is always
/// preserved in the catalog and can be shown instead.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum AnnotationDisplay {
    /// Show only the first line of the annotation.
    #[default]
    FirstLine,

    /// Show the whole annotation.
    Full,
}

impl AnnotationDisplay {
    /// Returns the string values accepted by the [`FromStr`] implementation.
    pub fn variants() -> [&'static str; 2] {
        ["first-line", "full"]
    }
}

impl fmt::Display for AnnotationDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationDisplay::FirstLine => write!(f, "first-line"),
            AnnotationDisplay::Full => write!(f, "full"),
        }
    }
}

impl FromStr for AnnotationDisplay {
    type Err = AnnotationDisplayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-line" => Ok(AnnotationDisplay::FirstLine),
            "full" => Ok(AnnotationDisplay::Full),
            other => Err(AnnotationDisplayParseError::new(other)),
        }
    }
}

/// Options for a [`CatalogReporter`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ReporterOpts {
    /// How much of each annotation to show.
    pub annotation_display: AnnotationDisplay,

    /// Whether to show failure messages under failed cases.
    pub failure_output: FailureOutput,
}

/// Whether to show failure messages under failed cases.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FailureOutput {
    /// Show the failure message immediately under the case line.
    #[default]
    Immediate,

    /// Never show failure messages.
    Never,
}

/// Renders catalog run events as human-readable lines.
///
/// The reporter is writer-agnostic: callers pass any
/// [`WriteColor`] target, typically a
/// [`termcolor::StandardStream`] built with [`Color::color_choice`].
#[derive(Clone, Debug)]
pub struct CatalogReporter {
    opts: ReporterOpts,
    name_width: usize,
}

impl CatalogReporter {
    /// Creates a new reporter for the given catalog.
    pub fn new(catalog: &TestCaseCatalog, opts: ReporterOpts) -> Self {
        let name_width = catalog
            .iter()
            .map(|case| case.name().len())
            .max()
            .unwrap_or_default();
        Self { opts, name_width }
    }

    /// Renders a catalog event to the given writer.
    pub fn report_event(
        &self,
        event: CatalogEvent<'_>,
        mut writer: impl WriteColor,
    ) -> io::Result<()> {
        match event {
            CatalogEvent::RunStarted { catalog } => {
                writer.set_color(&pass_spec())?;
                write!(writer, "{:>12} ", "Starting")?;
                writer.reset()?;

                writer.set_color(&count_spec())?;
                write!(writer, "{}", catalog.case_count())?;
                writer.reset()?;
                write!(writer, " test cases")?;

                if let Some(annotation) = catalog.annotation() {
                    write!(writer, ": ")?;
                    writer.set_color(&catalog_spec())?;
                    write!(writer, "{}", annotation.first_line())?;
                    writer.reset()?;
                }
                writeln!(writer)?;
            }
            CatalogEvent::CaseStarted { .. } => {}
            CatalogEvent::CaseFinished {
                name,
                annotation,
                run_status,
            } => {
                match run_status.status {
                    CaseStatus::Pass => writer.set_color(&pass_spec())?,
                    CaseStatus::Fail => writer.set_color(&fail_spec())?,
                }
                write!(writer, "{:>12} ", run_status.status)?;
                writer.reset()?;

                // * > means right-align.
                // * 8 is the number of characters to pad to.
                // * .3 means print three digits after the decimal point.
                write!(writer, "[{:>8.3?}s] ", run_status.time_taken.as_secs_f64())?;

                self.write_name(name, annotation.is_some(), &mut writer)?;
                self.write_annotation(annotation, &mut writer)?;
                writeln!(writer)?;

                if run_status.status == CaseStatus::Fail
                    && self.opts.failure_output == FailureOutput::Immediate
                    && let Some(message) = &run_status.failure_message
                {
                    writer.set_color(&fail_output_spec())?;
                    for line in message.lines() {
                        writeln!(writer, "        {line}")?;
                    }
                    writer.reset()?;
                }
            }
            CatalogEvent::CaseErrored { annotation, error } => {
                writer.set_color(&fail_spec())?;
                write!(writer, "{:>12} ", "ERROR")?;
                writer.reset()?;
                // same spacing as [   0.000s]
                write!(writer, "[         ] ")?;

                self.write_name(error.name(), annotation.is_some(), &mut writer)?;
                self.write_annotation(annotation, &mut writer)?;
                writeln!(writer)?;

                writer.set_color(&fail_output_spec())?;
                write!(writer, "        {error}")?;
                if let Some(source) = error.source() {
                    write!(writer, ": {source}")?;
                }
                writeln!(writer)?;
                writer.reset()?;
            }
            CatalogEvent::RunFinished {
                start_time,
                run_stats:
                    RunStats {
                        initial_run_count,
                        final_run_count,
                        passed,
                        failed,
                        exec_failed,
                    },
            } => {
                let summary_spec = if failed > 0 || exec_failed > 0 {
                    fail_spec()
                } else {
                    pass_spec()
                };
                writer.set_color(&summary_spec)?;
                write!(writer, "{:>12} ", "Summary")?;
                writer.reset()?;

                write!(writer, "[{:>8.3?}s] ", start_time.elapsed().as_secs_f64())?;

                writer.set_color(&count_spec())?;
                write!(writer, "{final_run_count}")?;
                if final_run_count != initial_run_count {
                    write!(writer, "/{initial_run_count}")?;
                }
                writer.reset()?;
                write!(writer, " test cases run: ")?;

                writer.set_color(&count_spec())?;
                write!(writer, "{passed}")?;
                writer.set_color(&pass_spec())?;
                write!(writer, " passed")?;
                writer.reset()?;

                if failed > 0 {
                    write!(writer, ", ")?;
                    writer.set_color(&count_spec())?;
                    write!(writer, "{failed}")?;
                    writer.set_color(&fail_spec())?;
                    write!(writer, " failed")?;
                    writer.reset()?;
                }

                if exec_failed > 0 {
                    write!(writer, ", ")?;
                    writer.set_color(&count_spec())?;
                    write!(writer, "{exec_failed}")?;
                    writer.set_color(&fail_spec())?;
                    write!(writer, " errored")?;
                    writer.reset()?;
                }

                writeln!(writer)?;
            }
        }
        Ok(())
    }

    // ---
    // Helper methods
    // ---

    fn write_name(
        &self,
        name: &str,
        pad: bool,
        mut writer: impl WriteColor,
    ) -> io::Result<()> {
        writer.set_color(&case_name_spec())?;
        if pad {
            write!(writer, "{:<width$}", name, width = self.name_width)?;
        } else {
            write!(writer, "{name}")?;
        }
        writer.reset()
    }

    fn write_annotation(
        &self,
        annotation: Option<&Annotation>,
        mut writer: impl WriteColor,
    ) -> io::Result<()> {
        let Some(annotation) = annotation else {
            return Ok(());
        };
        match self.opts.annotation_display {
            AnnotationDisplay::FirstLine => {
                write!(writer, "  {}", annotation.first_line())?;
            }
            AnnotationDisplay::Full => {
                let mut lines = annotation.full_text().lines();
                if let Some(first) = lines.next() {
                    write!(writer, "  {}", first.trim_end())?;
                }
                for line in lines {
                    write!(writer, "\n        {}", line.trim_end())?;
                }
            }
        }
        Ok(())
    }
}

/// An event produced while running a catalog.
///
/// Passed to the callback given to
/// [`CatalogRunner::execute`](crate::runner::CatalogRunner::execute).
#[derive(Debug)]
pub enum CatalogEvent<'cat> {
    /// The catalog run started.
    RunStarted {
        /// The catalog being run.
        catalog: &'cat TestCaseCatalog,
    },

    /// A case started running.
    CaseStarted {
        /// The name of the case.
        name: &'cat str,

        /// The annotation attached to the case, if any.
        annotation: Option<&'cat Annotation>,
    },

    /// A case finished running with a PASS or FAIL outcome.
    CaseFinished {
        /// The name of the case.
        name: &'cat str,

        /// The annotation attached to the case, if any.
        annotation: Option<&'cat Annotation>,

        /// Information about how the case ran.
        run_status: CaseRunStatus,
    },

    /// A case body produced an execution error rather than an outcome.
    CaseErrored {
        /// The annotation attached to the case, if any.
        annotation: Option<&'cat Annotation>,

        /// The error, which carries the case name.
        error: ExecutionError,
    },

    /// The catalog run finished.
    RunFinished {
        /// The time at which the run was started.
        start_time: Instant,

        /// Statistics for the run.
        run_stats: RunStats,
    },
}

fn count_spec() -> ColorSpec {
    let mut color_spec = ColorSpec::new();
    color_spec.set_bold(true);
    color_spec
}

fn pass_spec() -> ColorSpec {
    let mut color_spec = ColorSpec::new();
    color_spec
        .set_fg(Some(termcolor::Color::Green))
        .set_bold(true);
    color_spec
}

fn fail_spec() -> ColorSpec {
    let mut color_spec = ColorSpec::new();
    color_spec
        .set_fg(Some(termcolor::Color::Red))
        .set_bold(true);
    color_spec
}

fn fail_output_spec() -> ColorSpec {
    let mut color_spec = ColorSpec::new();
    color_spec.set_fg(Some(termcolor::Color::Red));
    color_spec
}
