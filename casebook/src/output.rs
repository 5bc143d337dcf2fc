// Copyright (c) The casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output formats for catalog listings.

use crate::errors::{OutputFormatParseError, WriteCatalogError};
use serde::Serialize;
use std::{fmt, io, str::FromStr};

/// The format in which a catalog listing is written.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// A human-readable listing.
    #[default]
    Plain,

    /// A machine-readable listing.
    Serializable(SerializableFormat),
}

impl OutputFormat {
    /// Returns the string values accepted by the [`FromStr`] implementation.
    pub fn variants() -> [&'static str; 3] {
        ["plain", "json", "json-pretty"]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Serializable(SerializableFormat::Json) => write!(f, "json"),
            OutputFormat::Serializable(SerializableFormat::JsonPretty) => write!(f, "json-pretty"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let val = match s {
            "plain" => OutputFormat::Plain,
            "json" => OutputFormat::Serializable(SerializableFormat::Json),
            "json-pretty" => OutputFormat::Serializable(SerializableFormat::JsonPretty),
            other => return Err(OutputFormatParseError::new(other)),
        };
        Ok(val)
    }
}

/// A machine-readable listing format.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SerializableFormat {
    /// Compact JSON.
    Json,

    /// Indented JSON.
    JsonPretty,
}

impl SerializableFormat {
    /// Writes this data in the given format to the writer.
    pub fn to_writer(
        self,
        value: &impl Serialize,
        writer: impl io::Write,
    ) -> Result<(), WriteCatalogError> {
        match self {
            SerializableFormat::Json => Ok(serde_json::to_writer(writer, value)?),
            SerializableFormat::JsonPretty => Ok(serde_json::to_writer_pretty(writer, value)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn output_format_variants() {
        for &variant in &OutputFormat::variants() {
            variant.parse::<OutputFormat>().expect("variant is valid");
        }
    }

    #[test_case(OutputFormat::Plain; "plain")]
    #[test_case(OutputFormat::Serializable(SerializableFormat::Json); "json")]
    #[test_case(OutputFormat::Serializable(SerializableFormat::JsonPretty); "json pretty")]
    fn output_format_display_roundtrip(format: OutputFormat) {
        let displayed = format!("{format}");
        let format2 = displayed
            .parse::<OutputFormat>()
            .expect("Display output is valid");
        assert_eq!(format, format2, "Display -> FromStr roundtrips");
    }

    #[test]
    fn output_format_rejects_unknown() {
        "yaml".parse::<OutputFormat>().expect_err("not a format");
    }
}
