//! # Text Formatter
//!
//! Flattens structured request data (JSON objects and arrays) into plain,
//! indented text lines suitable for a receipt.
//!
//! ## Rules
//!
//! | Input | Output |
//! |-------|--------|
//! | scalar | its text on its own line |
//! | map entry, scalar value | `key: value` |
//! | map entry, structured value | `key:` then the value one level deeper |
//! | sequence element, scalar | the element at the current level |
//! | sequence element, structured | the element one level deeper |
//!
//! One tab per nesting level. Map keys and sequence elements keep the order
//! they arrived in.
//!
//! ## Example
//!
//! ```
//! use printpost::format::{format_value, FormatOptions, TextValue};
//! use serde_json::json;
//!
//! let value = TextValue::from(&json!({
//!     "order": "#1",
//!     "toppings": ["Cheese", "Bacon"]
//! }));
//! let text = format_value(&value, &FormatOptions::default()).unwrap();
//! assert_eq!(text.to_string(), "order: #1\ntoppings:\n\tCheese\n\tBacon");
//! ```

use std::fmt;

use serde_json::Value;

use crate::error::JobError;

/// Deepest nesting accepted before the value is rejected.
pub const MAX_DEPTH: usize = 32;

/// Dynamic text input: a string, or nested maps and sequences of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextValue {
    Scalar(String),
    /// Ordered key/value pairs
    Mapping(Vec<(String, TextValue)>),
    Sequence(Vec<TextValue>),
}

impl TextValue {
    /// Whether this value nests other values.
    pub fn is_structured(&self) -> bool {
        !matches!(self, TextValue::Scalar(_))
    }
}

impl From<&Value> for TextValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => TextValue::Scalar(String::new()),
            Value::Bool(b) => TextValue::Scalar(b.to_string()),
            Value::Number(n) => TextValue::Scalar(n.to_string()),
            Value::String(s) => TextValue::Scalar(s.clone()),
            Value::Array(items) => TextValue::Sequence(items.iter().map(TextValue::from).collect()),
            Value::Object(map) => TextValue::Mapping(
                map.iter()
                    .map(|(key, value)| (key.clone(), TextValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TextValue {
    fn from(s: &str) -> Self {
        TextValue::Scalar(s.to_string())
    }
}

/// Presentation switches for the formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Insert one blank line after a top-level key whose value was a map or
    /// sequence (never after the last key).
    pub blank_line_after_nested: bool,
}

/// One output line and its indentation depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub depth: usize,
    pub text: String,
}

/// Formatter output: ordered, indented lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedText {
    lines: Vec<Line>,
}

impl FormattedText {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, depth: usize, text: impl Into<String>) {
        self.lines.push(Line {
            depth,
            text: text.into(),
        });
    }

    fn push_blank(&mut self) {
        self.push(0, String::new());
    }
}

impl fmt::Display for FormattedText {
    /// Tabs for indentation, `\n` between lines. Blank lines carry no tabs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            if !line.text.is_empty() {
                for _ in 0..line.depth {
                    f.write_str("\t")?;
                }
                f.write_str(&line.text)?;
            }
        }
        Ok(())
    }
}

/// Flatten a value into indented lines.
///
/// ## Errors
///
/// [`JobError::UnsupportedValue`] if a key or leaf holds a control character
/// other than tab or a line break, or if nesting exceeds [`MAX_DEPTH`].
pub fn format_value(value: &TextValue, options: &FormatOptions) -> Result<FormattedText, JobError> {
    let mut writer = Writer {
        options,
        out: FormattedText::default(),
    };
    writer.value(value, 0)?;
    Ok(writer.out)
}

struct Writer<'a> {
    options: &'a FormatOptions,
    out: FormattedText,
}

impl Writer<'_> {
    fn value(&mut self, value: &TextValue, depth: usize) -> Result<(), JobError> {
        if depth > MAX_DEPTH {
            return Err(JobError::UnsupportedValue(format!(
                "nesting deeper than {} levels",
                MAX_DEPTH
            )));
        }

        match value {
            TextValue::Scalar(s) => self.scalar(s, depth),
            TextValue::Mapping(entries) => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    self.entry(key, value, depth)?;

                    let more = i + 1 < entries.len();
                    if depth == 0 && more && value.is_structured() && self.options.blank_line_after_nested {
                        self.out.push_blank();
                    }
                }
                Ok(())
            }
            TextValue::Sequence(items) => {
                for item in items {
                    match item {
                        TextValue::Scalar(s) => self.scalar(s, depth)?,
                        nested => self.value(nested, depth + 1)?,
                    }
                }
                Ok(())
            }
        }
    }

    fn entry(&mut self, key: &str, value: &TextValue, depth: usize) -> Result<(), JobError> {
        check_key(key)?;

        match value {
            TextValue::Scalar(s) => {
                check_printable(s)?;
                let mut parts = split_lines(s);
                match parts.next() {
                    Some(first) if !first.is_empty() => self.out.push(depth, format!("{}: {}", key, first)),
                    _ => self.out.push(depth, format!("{}:", key)),
                }
                for part in parts {
                    self.out.push(depth, part);
                }
                Ok(())
            }
            nested => {
                self.out.push(depth, format!("{}:", key));
                self.value(nested, depth + 1)
            }
        }
    }

    fn scalar(&mut self, s: &str, depth: usize) -> Result<(), JobError> {
        check_printable(s)?;
        for part in split_lines(s) {
            self.out.push(depth, part);
        }
        Ok(())
    }
}

/// Split on `\n`, dropping a `\r` left over from CRLF.
fn split_lines(s: &str) -> impl Iterator<Item = &str> {
    s.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Keys must stay on their own line.
fn check_key(key: &str) -> Result<(), JobError> {
    if key.contains(['\n', '\r']) {
        return Err(JobError::UnsupportedValue(format!("line break in key {:?}", key)));
    }
    check_printable(key)
}

fn check_printable(s: &str) -> Result<(), JobError> {
    match s.chars().find(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r')) {
        Some(c) => Err(JobError::UnsupportedValue(format!(
            "control character U+{:04X} in {:?}",
            c as u32, s
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn lines_of(value: serde_json::Value, options: FormatOptions) -> Vec<String> {
        let formatted = format_value(&TextValue::from(&value), &options).unwrap();
        formatted.to_string().split('\n').map(str::to_string).collect()
    }

    #[test]
    fn test_order_example() {
        let lines = lines_of(
            json!({"order": "#1", "item": "Smashburger", "toppings": ["Cheese", "Bacon"]}),
            FormatOptions::default(),
        );
        assert_eq!(lines, vec!["order: #1", "item: Smashburger", "toppings:", "\tCheese", "\tBacon"]);
    }

    #[test]
    fn test_key_order_is_preserved() {
        let lines = lines_of(json!({"zulu": 1, "alpha": 2, "mike": 3}), FormatOptions::default());
        assert_eq!(lines, vec!["zulu: 1", "alpha: 2", "mike: 3"]);
    }

    #[test]
    fn test_deterministic() {
        let value = TextValue::from(&json!({
            "table": 4,
            "items": [{"name": "Fries", "qty": 2}, "Shake"],
            "notes": {"allergy": "peanuts", "rush": true}
        }));
        let options = FormatOptions::default();
        let first = format_value(&value, &options).unwrap();
        for _ in 0..5 {
            assert_eq!(format_value(&value, &options).unwrap(), first);
        }
    }

    #[test]
    fn test_nested_structures_indent() {
        let lines = lines_of(
            json!({
                "items": [{"name": "Fries", "qty": 2}, "Shake"],
                "notes": {"allergy": "peanuts", "extra": ["napkins"]}
            }),
            FormatOptions::default(),
        );
        assert_eq!(
            lines,
            vec![
                "items:",
                "\t\tname: Fries",
                "\t\tqty: 2",
                "\tShake",
                "notes:",
                "\tallergy: peanuts",
                "\textra:",
                "\t\tnapkins",
            ]
        );
    }

    #[test]
    fn test_top_level_sequence() {
        let lines = lines_of(json!(["one", ["two", "three"], 4]), FormatOptions::default());
        assert_eq!(lines, vec!["one", "\ttwo", "\tthree", "4"]);
    }

    #[test]
    fn test_scalars_render_as_text() {
        let lines = lines_of(json!({"paid": true, "total": 12.5, "tip": null}), FormatOptions::default());
        assert_eq!(lines, vec!["paid: true", "total: 12.5", "tip:"]);
    }

    #[test]
    fn test_blank_line_after_nested_option() {
        let options = FormatOptions {
            blank_line_after_nested: true,
        };
        let lines = lines_of(
            json!({"toppings": ["Cheese"], "order": "#1", "sides": ["Fries"]}),
            options,
        );
        assert_eq!(lines, vec!["toppings:", "\tCheese", "", "order: #1", "sides:", "\tFries"]);
    }

    #[test]
    fn test_multiline_leaf_continues_at_same_depth() {
        let lines = lines_of(json!({"note": "first\r\nsecond"}), FormatOptions::default());
        assert_eq!(lines, vec!["note: first", "second"]);
    }

    #[test]
    fn test_control_character_rejected() {
        let value = TextValue::from(&json!({"bell": "ding\u{7}"}));
        let err = format_value(&value, &FormatOptions::default()).unwrap_err();
        assert!(matches!(err, JobError::UnsupportedValue(_)));
    }

    #[test]
    fn test_control_character_in_key_rejected() {
        let value = TextValue::from(&json!({"\u{1b}[1m": "bold"}));
        assert!(format_value(&value, &FormatOptions::default()).is_err());
    }

    #[test]
    fn test_line_break_in_key_rejected() {
        for key in ["a\nb", "a\r\nb", "nested\r"] {
            let value = TextValue::Mapping(vec![(
                "items".to_string(),
                TextValue::Mapping(vec![(key.to_string(), TextValue::from("v"))]),
            )]);
            let err = format_value(&value, &FormatOptions::default()).unwrap_err();
            assert!(matches!(err, JobError::UnsupportedValue(_)));
        }
        // Leaves may still span lines
        assert!(format_value(&TextValue::from(&json!({"k": "a\nb"})), &FormatOptions::default()).is_ok());
    }

    #[test]
    fn test_too_deep_rejected() {
        let mut value = TextValue::from("leaf");
        for _ in 0..=MAX_DEPTH {
            value = TextValue::Sequence(vec![TextValue::Sequence(vec![value])]);
        }
        let err = format_value(&value, &FormatOptions::default()).unwrap_err();
        assert!(matches!(err, JobError::UnsupportedValue(_)));
    }

    #[test]
    fn test_flat_string_passes_through() {
        let value = TextValue::from("Order #1\n\tCheese");
        let formatted = format_value(&value, &FormatOptions::default()).unwrap();
        assert_eq!(formatted.to_string(), "Order #1\n\tCheese");
    }
}
