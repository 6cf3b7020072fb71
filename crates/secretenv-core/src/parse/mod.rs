//! Raw environment file parsing
//!
//! Environment files come in two shapes:
//!
//! ```text
//! # dotenv
//! DB_USER=admin
//! DB_PASSWORD="{{ company/app/db/password }}"
//! ```
//!
//! ```yaml
//! # flat YAML mapping
//! DB_USER: admin
//! DB_PASSWORD: "{{ company/app/db/password }}"
//! ```
//!
//! The dotenv parser is tried first. If it fails, the bytes it consumed are
//! parsed as YAML. Only dotenv entries carry positions, which the template
//! compiler uses for error messages.
//!
//! The input is scanned in fixed-size chunks, so when the dotenv parser fails
//! early in a large input the YAML fallback only sees the chunks read so far.

mod quote;

pub use quote::trim_quotes;

use crate::error::{EnvError, EnvResult};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read};

/// Size of the chunks the dotenv scanner reads at a time
pub const SCAN_BUFFER_SIZE: usize = 4096;

const NOT_KEY_VALUE: &str = "template is not formatted as key=value pairs";

/// An uncompiled `key=value` entry and its position in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEnvVar {
    pub key: String,
    pub value: String,
    /// 1-based line number, `None` when the entry came from YAML
    pub line: Option<usize>,
    /// 1-based column of the key; 1 for YAML entries
    pub column_key: usize,
    /// 1-based column of the value, after any stripped quote; 1 for YAML entries
    pub column_value: usize,
}

/// Reader that keeps a copy of everything read through it
struct TeeReader<R> {
    inner: R,
    captured: Vec<u8>,
}

impl<R: Read> TeeReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            captured: Vec::new(),
        }
    }
}

impl<R: Read> Read for TeeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.captured.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// Parse an environment file in dotenv or flat YAML format.
///
/// Entries are returned ordered by line (dotenv) or key (YAML). When neither
/// format parses, the dotenv error is returned.
pub fn parse_environment<R: Read>(reader: R) -> EnvResult<Vec<RawEnvVar>> {
    let mut tee = TeeReader::new(reader);
    let dotenv = parse_dotenv(BufReader::with_capacity(SCAN_BUFFER_SIZE, &mut tee));

    let dotenv_err = match dotenv {
        Ok(vars) => {
            let mut vars: Vec<RawEnvVar> = vars.into_values().collect();
            vars.sort_by_key(|v| v.line);
            return Ok(vars);
        }
        Err(err) => err,
    };

    tracing::debug!(
        error = %dotenv_err,
        captured_bytes = tee.captured.len(),
        "Input is not in dotenv format, trying YAML"
    );

    match parse_yaml(&tee.captured) {
        Ok(vars) => Ok(vars),
        Err(yaml_err) => {
            tracing::debug!(error = %yaml_err, "YAML fallback failed");
            Err(dotenv_err)
        }
    }
}

/// Parse `key=value` lines. Later definitions of a key replace earlier ones.
fn parse_dotenv<R: BufRead>(reader: R) -> EnvResult<HashMap<String, RawEnvVar>> {
    let mut vars = HashMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => EnvError::parse(Some(line_no), "line is not valid UTF-8"),
            _ => EnvError::Io(e),
        })?;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key_part, value_part) = line
            .split_once('=')
            .ok_or_else(|| EnvError::parse(Some(line_no), NOT_KEY_VALUE))?;

        let key_start = key_part.trim_start();
        let column_key = 1 + char_len(key_part) - char_len(key_start);
        let key = key_start.trim_end();

        let value_start = value_part.trim_start();
        let mut column_value =
            char_len(key_part) + 2 + char_len(value_part) - char_len(value_start);
        let (value, was_quoted) = trim_quotes(value_start.trim_end());
        if was_quoted {
            column_value += 1;
        }

        vars.insert(
            key.to_string(),
            RawEnvVar {
                key: key.to_string(),
                value: value.to_string(),
                line: Some(line_no),
                column_key,
                column_value,
            },
        );
    }

    Ok(vars)
}

fn parse_yaml(bytes: &[u8]) -> Result<Vec<RawEnvVar>, serde_yaml::Error> {
    let map: HashMap<String, String> = serde_yaml::from_slice(bytes)?;
    let mut vars: Vec<RawEnvVar> = map
        .into_iter()
        .map(|(key, value)| RawEnvVar {
            key,
            value,
            line: None,
            column_key: 1,
            column_value: 1,
        })
        .collect();
    vars.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(vars)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(input: &str) -> EnvResult<Vec<RawEnvVar>> {
        parse_environment(input.as_bytes())
    }

    #[test]
    fn test_comments_blank_lines_and_quotes() {
        let vars = parse("FOO=bar\n# comment\n\nBAZ=\"qux\"\n").unwrap();
        assert_eq!(vars.len(), 2);

        assert_eq!(vars[0].key, "FOO");
        assert_eq!(vars[0].value, "bar");
        assert_eq!(vars[0].line, Some(1));

        assert_eq!(vars[1].key, "BAZ");
        assert_eq!(vars[1].value, "qux");
        assert_eq!(vars[1].line, Some(4));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let vars = parse("A=1\nB=2\nA=3\n").unwrap();
        assert_eq!(vars.len(), 2);
        let a = vars.iter().find(|v| v.key == "A").unwrap();
        assert_eq!(a.value, "3");
        assert_eq!(a.line, Some(3));
    }

    #[test]
    fn test_split_on_first_equals_only() {
        let vars = parse("URL=postgres://host/db?sslmode=require\n").unwrap();
        assert_eq!(vars[0].key, "URL");
        assert_eq!(vars[0].value, "postgres://host/db?sslmode=require");
    }

    #[test]
    fn test_columns() {
        let vars = parse("  KEY = \"value\"\n").unwrap();
        assert_eq!(vars[0].key, "KEY");
        assert_eq!(vars[0].value, "value");
        assert_eq!(vars[0].column_key, 3);
        assert_eq!(vars[0].column_value, 10);

        let vars = parse("FOO=bar").unwrap();
        assert_eq!(vars[0].column_key, 1);
        assert_eq!(vars[0].column_value, 5);
    }

    #[test]
    fn test_mismatched_quotes_are_kept() {
        let vars = parse("A='foo\"\n").unwrap();
        assert_eq!(vars[0].value, "'foo\"");
        assert_eq!(vars[0].column_value, 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let vars = parse("A=1\r\nB=2\r\n").unwrap();
        assert_eq!(vars[0].value, "1");
        assert_eq!(vars[1].value, "2");
    }

    #[test]
    fn test_missing_equals_reports_dotenv_error() {
        let err = parse("not a valid line").unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert_eq!(
            err.to_string(),
            "template error on line 1: template is not formatted as key=value pairs"
        );
    }

    #[test]
    fn test_missing_equals_later_line() {
        let err = parse("A=1\nB=2\n- item\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_yaml_fallback() {
        let vars = parse("FOO: bar\nBAZ: \"qux\"\n").unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].key, "BAZ");
        assert_eq!(vars[0].value, "qux");
        assert_eq!(vars[1].key, "FOO");
        assert_eq!(vars[1].value, "bar");
        assert!(vars.iter().all(|v| v.line.is_none()));
    }

    #[test]
    fn test_nested_yaml_is_rejected_with_dotenv_error() {
        let err = parse("database:\n  host: localhost\n").unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n# only comments\n").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_error() {
        let err = parse_environment(&b"A=1\nB=\xff\xfe\n"[..]).unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(err.line(), Some(2));
    }

    // The YAML fallback only sees the first chunk the dotenv scanner read.
    #[test]
    fn test_yaml_fallback_sees_truncated_prefix() {
        // 16 bytes per line, so the first chunk ends exactly on a line boundary.
        let input: String = (0..600).map(|i| format!("K{:04}: vvvvvvvv\n", i)).collect();
        assert_eq!(input.len(), 600 * 16);

        let vars = parse(&input).unwrap();
        assert_eq!(vars.len(), SCAN_BUFFER_SIZE / 16);
        assert_eq!(vars.first().unwrap().key, "K0000");
        assert_eq!(vars.last().unwrap().key, "K0255");
        assert!(!vars.iter().any(|v| v.key == "K0599"));
    }

    #[test]
    fn test_truncated_yaml_fallback_failure_surfaces_dotenv_error() {
        // The chunk boundary cuts a line in half, leaving a dangling key.
        let mut input = String::from("FIRST: line\n");
        input.push_str(&"x".repeat(SCAN_BUFFER_SIZE));
        input.push_str(": value\n");

        let err = parse(&input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "template error on line 1: template is not formatted as key=value pairs"
        );
    }

    proptest! {
        #[test]
        fn prop_last_definition_wins(
            entries in proptest::collection::vec((0..4usize, "[a-z0-9]{0,8}"), 1..30),
        ) {
            let input: String = entries
                .iter()
                .map(|(key, value)| format!("K{key}={value}\n"))
                .collect();
            let vars = parse(&input).unwrap();

            let mut expected: HashMap<String, (String, usize)> = HashMap::new();
            for (index, (key, value)) in entries.iter().enumerate() {
                expected.insert(format!("K{key}"), (value.clone(), index + 1));
            }

            prop_assert_eq!(vars.len(), expected.len());
            for var in &vars {
                let (value, line) = &expected[&var.key];
                prop_assert_eq!(&var.value, value);
                prop_assert_eq!(var.line, Some(*line));
            }
        }

        #[test]
        fn prop_comments_and_blank_lines_are_skipped(
            lines in proptest::collection::vec((0..3u8, "[a-z]{0,6}"), 0..40),
        ) {
            let mut input = String::new();
            let mut expected = Vec::new();
            for (index, (kind, text)) in lines.iter().enumerate() {
                match kind {
                    0 => input.push_str("   "),
                    1 => input.push_str(&format!("  # {text}=ignored")),
                    _ => {
                        input.push_str(&format!("K{index}={text}"));
                        expected.push((format!("K{index}"), text.clone(), Some(index + 1)));
                    }
                }
                input.push('\n');
            }

            let vars = parse(&input).unwrap();
            let actual: Vec<_> = vars.into_iter().map(|v| (v.key, v.value, v.line)).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
