// Copyright (c) The casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Executing the cases in a catalog.

use crate::{
    catalog::{Annotation, TestCase, TestCaseCatalog},
    errors::{CaseNotFound, ExecutionError, RunError},
    reporter::CatalogEvent,
};
use serde::{Deserialize, Serialize};
use std::{
    any::Any,
    convert::Infallible,
    fmt,
    panic::{self, AssertUnwindSafe},
    time::{Duration, Instant},
};
use tracing::debug;

/// Context for running the cases in a catalog.
///
/// Execution is synchronous and single-threaded: each case body runs to
/// completion on the calling thread before the next one starts. No timeout
/// or cancellation semantics are provided; callers needing bounded execution
/// time must wrap the run themselves.
#[derive(Clone, Copy, Debug)]
pub struct CatalogRunner<'cat> {
    catalog: &'cat TestCaseCatalog,
}

impl<'cat> CatalogRunner<'cat> {
    /// Creates a new runner for the given catalog.
    pub fn new(catalog: &'cat TestCaseCatalog) -> Self {
        Self { catalog }
    }

    /// Runs the named case and returns how it went.
    ///
    /// An assertion failure in the body is a normal [`CaseStatus::Fail`]
    /// outcome. A body that returns an error instead produces
    /// [`RunError::Execution`], keeping "the test found a bug" distinct from
    /// "the test is broken".
    pub fn run(&self, name: &str) -> Result<CaseRunStatus, RunError> {
        let case = self
            .catalog
            .get(name)
            .ok_or_else(|| CaseNotFound::new(name))?;
        Ok(run_case(case)?)
    }

    /// Runs every case in declaration order, yielding results lazily.
    ///
    /// The iterator is finite and restartable: calling `run_all` again
    /// re-executes every case independently.
    pub fn run_all(
        &self,
    ) -> impl Iterator<Item = Result<CaseRun<'cat>, ExecutionError>> + use<'cat> {
        let catalog = self.catalog;
        catalog.iter().map(|case| {
            run_case(case).map(|run_status| CaseRun {
                name: case.name(),
                annotation: case.annotation(),
                run_status,
            })
        })
    }

    /// Runs every case in declaration order.
    ///
    /// The callback is called with events as the run progresses.
    pub fn execute<F>(&self, mut callback: F) -> RunStats
    where
        F: FnMut(CatalogEvent<'cat>),
    {
        self.try_execute::<Infallible, _>(|event| {
            callback(event);
            Ok(())
        })
        .expect("Err branch is infallible")
    }

    /// Runs every case in declaration order.
    ///
    /// Accepts a callback that is called with events as the run progresses.
    /// If the callback returns an error, the run stops and the error is
    /// returned.
    pub fn try_execute<E, F>(&self, mut callback: F) -> Result<RunStats, E>
    where
        F: FnMut(CatalogEvent<'cat>) -> Result<(), E>,
    {
        let start_time = Instant::now();
        let mut run_stats = RunStats {
            initial_run_count: self.catalog.case_count(),
            ..RunStats::default()
        };

        callback(CatalogEvent::RunStarted {
            catalog: self.catalog,
        })?;

        for case in self.catalog.iter() {
            callback(CatalogEvent::CaseStarted {
                name: case.name(),
                annotation: case.annotation(),
            })?;

            run_stats.final_run_count += 1;
            match run_case(case) {
                Ok(run_status) => {
                    match run_status.status {
                        CaseStatus::Pass => run_stats.passed += 1,
                        CaseStatus::Fail => run_stats.failed += 1,
                    }
                    callback(CatalogEvent::CaseFinished {
                        name: case.name(),
                        annotation: case.annotation(),
                        run_status,
                    })?;
                }
                Err(error) => {
                    run_stats.exec_failed += 1;
                    callback(CatalogEvent::CaseErrored {
                        annotation: case.annotation(),
                        error,
                    })?;
                }
            }
        }

        callback(CatalogEvent::RunFinished {
            start_time,
            run_stats,
        })?;
        Ok(run_stats)
    }
}

impl TestCaseCatalog {
    /// Runs the named case with a fresh runner. See [`CatalogRunner::run`].
    pub fn run(&self, name: &str) -> Result<CaseRunStatus, RunError> {
        CatalogRunner::new(self).run(name)
    }

    /// Runs every case in declaration order with a fresh runner. See
    /// [`CatalogRunner::run_all`].
    pub fn run_all(&self) -> impl Iterator<Item = Result<CaseRun<'_>, ExecutionError>> + '_ {
        CatalogRunner::new(self).run_all()
    }
}

// ---
// Helpers
// ---

/// Runs a single case body on the calling thread.
///
/// A panic in the body (a failed `assert!` and friends) is an assertion
/// failure and maps to `Fail`; the runner does not install or remove panic
/// hooks, so the usual panic output is the caller's concern. An `Err` return
/// from the body is an execution error.
fn run_case(case: &TestCase) -> Result<CaseRunStatus, ExecutionError> {
    let start_time = Instant::now();
    debug!(name = case.name(), "running test case");

    let result = panic::catch_unwind(AssertUnwindSafe(|| (case.body())()));
    let time_taken = start_time.elapsed();

    match result {
        Ok(Ok(())) => Ok(CaseRunStatus {
            status: CaseStatus::Pass,
            time_taken,
            failure_message: None,
        }),
        Ok(Err(error)) => Err(ExecutionError::new(case.name(), error)),
        Err(payload) => Ok(CaseRunStatus {
            status: CaseStatus::Fail,
            time_taken,
            failure_message: panic_message(&*payload),
        }),
    }
}

/// Recovers the message from a panic payload, if it carries one.
fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Some((*message).to_owned())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

/// The outcome of running a single case.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseStatus {
    /// The body ran to completion.
    Pass,

    /// The body signaled an assertion failure.
    Fail,
}

impl CaseStatus {
    /// Returns true if the case was successful.
    pub fn is_success(self) -> bool {
        match self {
            CaseStatus::Pass => true,
            CaseStatus::Fail => false,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Pass => f.pad("PASS"),
            CaseStatus::Fail => f.pad("FAIL"),
        }
    }
}

/// Information about a case that finished running.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseRunStatus {
    /// The outcome of the case.
    pub status: CaseStatus,

    /// How long the body took to run.
    pub time_taken: Duration,

    /// The message recovered from the assertion failure, if there was one
    /// and it carried a string payload.
    pub failure_message: Option<String>,
}

/// A finished case: its catalog entry paired with how the run went.
#[derive(Clone, Debug)]
pub struct CaseRun<'cat> {
    /// The name of the case.
    pub name: &'cat str,

    /// The annotation attached to the case, if any.
    pub annotation: Option<&'cat Annotation>,

    /// Information about how the case ran.
    pub run_status: CaseRunStatus,
}

/// Statistics for a catalog run.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct RunStats {
    /// The total number of cases that were expected to be run at the
    /// beginning.
    pub initial_run_count: usize,

    /// The total number of cases that were actually run.
    pub final_run_count: usize,

    /// The number of cases that passed.
    pub passed: usize,

    /// The number of cases that failed.
    pub failed: usize,

    /// The number of cases whose bodies produced an execution error.
    pub exec_failed: usize,
}

impl RunStats {
    /// Returns true if this run is considered a success.
    ///
    /// A run is marked as failed if any of the following are true:
    /// * the run stopped early: the initial run count is greater than the
    ///   final run count
    /// * any cases failed
    /// * any cases encountered an execution error
    pub fn is_success(&self) -> bool {
        if self.initial_run_count > self.final_run_count {
            return false;
        }
        if self.failed > 0 || self.exec_failed > 0 {
            return false;
        }
        true
    }
}
