use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    #[case("compact", LogFormat::Compact)]
    fn parses_known_formats(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(input.parse::<LogFormat>().expect("parse format"), expected);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!("pretty".parse::<LogFormat>().is_err());
    }

    #[test]
    fn display_matches_cli_spelling() {
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
