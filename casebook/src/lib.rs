// Copyright (c) The casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! An ordered catalog of named test cases with optional annotations.
//!
//! A [`catalog::TestCaseCatalog`] holds test cases in declaration order, each
//! with a unique name, an optional free-text annotation (the analogue of a
//! docstring), and an executable body. The [`runner`] module executes cases
//! and classifies each result as a PASS or FAIL outcome, keeping execution
//! errors in the body itself distinct from assertion failures. The
//! [`reporter`] module renders outcomes and first-line annotation summaries
//! to a terminal.

pub mod catalog;
pub mod errors;
pub mod output;
pub mod reporter;
pub mod runner;
