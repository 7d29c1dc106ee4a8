use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Class name applied to the listing container when the caller does not pick one.
pub const DEFAULT_CLASS_NAME: &str = "code-listing-default";

/// Attribute carrying a line's display index on numbering and code elements.
pub const LINE_ATTR: &str = "data-line";

/// Resolved listing configuration.
///
/// Pixel values only matter to the markup front-end; the terminal view measures in cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListingOptions {
    /// Class added to the listing container.
    pub class_name: String,
    /// Whether to render the numbering column.
    pub line_numbers: bool,
    /// Whether hover and click change line state.
    pub interactive: bool,
    /// Display index of the first line.
    pub numbering_start: i64,
    /// Assumed width of one digit, in px.
    pub monospace_character_width: u32,
    /// Padding on each side of the numbering column, in px.
    pub horizontal_padding: u32,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            line_numbers: true,
            interactive: true,
            numbering_start: 1,
            monospace_character_width: 10,
            horizontal_padding: 10,
        }
    }
}

/// A caller override that could not be applied. The default for that key is kept.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OptionIssue {
    #[error("listing overrides must be an object, got {0}")]
    NotAnObject(&'static str),
    #[error("option `{key}` expects {expected}, got {found}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("option `{key}` is out of range: {found}")]
    OutOfRange { key: &'static str, found: String },
    #[error("listing overrides are not valid JSON: {0}")]
    InvalidJson(String),
}

/// Parses an overrides object from JSON text, e.g. a command-line argument.
pub fn parse_overrides(text: &str) -> Result<Value, OptionIssue> {
    serde_json::from_str(text).map_err(|e| OptionIssue::InvalidJson(e.to_string()))
}

impl ListingOptions {
    /// Defaults with `overrides` applied on top.
    ///
    /// Never fails: every override that cannot be used is reported and skipped.
    pub fn resolve(overrides: &Value) -> (Self, Vec<OptionIssue>) {
        let mut options = Self::default();
        let issues = options.merge(overrides);
        (options, issues)
    }

    /// Applies the recognized keys of `overrides` over the current values.
    pub fn merge(&mut self, overrides: &Value) -> Vec<OptionIssue> {
        let mut issues = Vec::new();
        let map = match overrides {
            Value::Null => return issues,
            Value::Object(map) => map,
            other => {
                issues.push(OptionIssue::NotAnObject(json_kind(other)));
                report(&issues);
                return issues;
            }
        };

        for key in map.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::debug!(key = key.as_str(), "ignoring unknown listing option");
            }
        }

        if let Some(v) = field(map, "className", &mut issues, as_string) {
            self.class_name = v;
        }
        if let Some(v) = field(map, "lineNumbers", &mut issues, as_bool) {
            self.line_numbers = v;
        }
        if let Some(v) = field(map, "interactive", &mut issues, as_bool) {
            self.interactive = v;
        }
        if let Some(v) = field(map, "numberingStart", &mut issues, as_int) {
            self.numbering_start = v;
        }
        if let Some(v) = field(map, "monospaceCharacterWidth", &mut issues, as_px) {
            self.monospace_character_width = v;
        }
        if let Some(v) = field(map, "horizontalPadding", &mut issues, as_px) {
            self.horizontal_padding = v;
        }

        report(&issues);
        issues
    }

    /// Width of the numbering column in px for `line_count` lines.
    pub fn numbering_width(&self, line_count: usize) -> u32 {
        let digits = self.label_width(line_count) as u32;
        digits
            .saturating_mul(self.monospace_character_width)
            .saturating_add(self.horizontal_padding.saturating_mul(2))
    }

    /// Characters needed by the widest line label. With a negative start the first label
    /// (`-10`) can be wider than the last (`-8`).
    pub fn label_width(&self, line_count: usize) -> usize {
        let first = self.numbering_start.to_string().len();
        let last = highest_index(self.numbering_start, line_count)
            .to_string()
            .len();
        first.max(last)
    }

    /// `true` when every line of a `line_count`-line listing gets its own index.
    pub fn fits_line_count(&self, line_count: usize) -> bool {
        let Ok(extra) = i64::try_from(line_count.saturating_sub(1)) else {
            return false;
        };
        self.numbering_start.checked_add(extra).is_some()
    }

    /// Horizontal offset of the code column in px.
    pub fn code_offset(&self, line_count: usize) -> u32 {
        if self.line_numbers {
            self.numbering_width(line_count)
        } else {
            0
        }
    }
}

/// Index of the last line; saturates, so callers check [`ListingOptions::fits_line_count`].
pub(crate) fn highest_index(start: i64, line_count: usize) -> i64 {
    start.saturating_add(line_count.saturating_sub(1) as i64)
}

const KNOWN_KEYS: [&str; 6] = [
    "className",
    "lineNumbers",
    "interactive",
    "numberingStart",
    "monospaceCharacterWidth",
    "horizontalPadding",
];

fn field<T>(
    map: &Map<String, Value>,
    key: &'static str,
    issues: &mut Vec<OptionIssue>,
    parse: impl Fn(&'static str, &Value) -> Result<T, OptionIssue>,
) -> Option<T> {
    let value = map.get(key)?;
    match parse(key, value) {
        Ok(v) => Some(v),
        Err(issue) => {
            issues.push(issue);
            None
        }
    }
}

fn report(issues: &[OptionIssue]) {
    for issue in issues {
        tracing::warn!(%issue, "listing option ignored");
    }
}

fn as_string(key: &'static str, value: &Value) -> Result<String, OptionIssue> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(wrong_type(key, "a string", other)),
    }
}

fn as_bool(key: &'static str, value: &Value) -> Result<bool, OptionIssue> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(wrong_type(key, "a boolean", other)),
    }
}

fn as_int(key: &'static str, value: &Value) -> Result<i64, OptionIssue> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => Ok(f as i64),
                _ => Err(OptionIssue::OutOfRange {
                    key,
                    found: n.to_string(),
                }),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| wrong_type(key, "an integer", value)),
        other => Err(wrong_type(key, "an integer", other)),
    }
}

fn as_px(key: &'static str, value: &Value) -> Result<u32, OptionIssue> {
    let px = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(px) = px else {
        return Err(wrong_type(key, "a number of pixels", value));
    };
    if !px.is_finite() || px < 0.0 || px.round() > u32::MAX as f64 {
        return Err(OptionIssue::OutOfRange {
            key,
            found: value.to_string(),
        });
    }
    Ok(px.round() as u32)
}

fn wrong_type(key: &'static str, expected: &'static str, found: &Value) -> OptionIssue {
    OptionIssue::WrongType {
        key,
        expected,
        found: found.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unspecified_keys_keep_defaults() {
        let (options, issues) = ListingOptions::resolve(&json!({ "numberingStart": 10 }));
        assert!(issues.is_empty());
        assert_eq!(options.numbering_start, 10);
        assert_eq!(options.class_name, DEFAULT_CLASS_NAME);
        assert!(options.line_numbers);
        assert_eq!(options.horizontal_padding, 10);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let (options, issues) = ListingOptions::resolve(&json!({
            "monospaceCharacterWidth": "wide",
            "lineNumbers": "yes",
            "horizontalPadding": -4,
            "interactive": false,
        }));
        assert_eq!(issues.len(), 3);
        assert_eq!(options.monospace_character_width, 10);
        assert!(options.line_numbers);
        assert_eq!(options.horizontal_padding, 10);
        assert!(!options.interactive);
    }

    #[test]
    fn numeric_strings_and_floats_are_accepted() {
        let (options, issues) = ListingOptions::resolve(&json!({
            "numberingStart": "7",
            "monospaceCharacterWidth": 8.4,
        }));
        assert!(issues.is_empty());
        assert_eq!(options.numbering_start, 7);
        assert_eq!(options.monospace_character_width, 8);
    }

    #[test]
    fn non_object_overrides_keep_everything() {
        let (options, issues) = ListingOptions::resolve(&json!([1, 2]));
        assert_eq!(options, ListingOptions::default());
        assert_eq!(issues, vec![OptionIssue::NotAnObject("an array")]);
        assert!(ListingOptions::resolve(&Value::Null).1.is_empty());
    }

    #[test]
    fn numbering_width_counts_digits_of_highest_index() {
        let options = ListingOptions::default();
        assert_eq!(options.numbering_width(9), 30);
        assert_eq!(options.numbering_width(10), 40);

        let options = ListingOptions {
            numbering_start: 95,
            ..ListingOptions::default()
        };
        assert_eq!(options.numbering_width(10), 50);

        let options = ListingOptions {
            line_numbers: false,
            ..ListingOptions::default()
        };
        assert_eq!(options.code_offset(10), 0);
    }

    #[test]
    fn negative_start_measures_the_widest_label() {
        let options = ListingOptions {
            numbering_start: -10,
            ..ListingOptions::default()
        };
        assert_eq!(options.label_width(3), 3);
        assert_eq!(options.numbering_width(3), 50);

        let options = ListingOptions {
            numbering_start: -2,
            ..ListingOptions::default()
        };
        assert_eq!(options.label_width(13), 2);
    }

    #[test]
    fn start_near_the_limit_does_not_fit_long_listings() {
        let options = ListingOptions {
            numbering_start: i64::MAX,
            ..ListingOptions::default()
        };
        assert!(options.fits_line_count(1));
        assert!(!options.fits_line_count(2));
        assert!(ListingOptions::default().fits_line_count(1000));
    }

    #[test]
    fn falsy_json_values_are_not_booleans() {
        let (options, issues) =
            ListingOptions::resolve(&json!({ "lineNumbers": 0, "interactive": "" }));
        assert!(options.line_numbers);
        assert!(options.interactive);
        assert!(matches!(
            issues.as_slice(),
            [
                OptionIssue::WrongType { key: "lineNumbers", .. },
                OptionIssue::WrongType { key: "interactive", .. },
            ]
        ));
    }

    #[test]
    fn override_text_must_be_json() {
        let value = parse_overrides(r#"{ "numberingStart": 3 }"#).expect("valid json");
        assert_eq!(ListingOptions::resolve(&value).0.numbering_start, 3);
        assert!(matches!(
            parse_overrides("{numberingStart: 3"),
            Err(OptionIssue::InvalidJson(_))
        ));
    }

    #[test]
    fn strict_deserialize_uses_camel_case_and_defaults() {
        let options: ListingOptions =
            serde_json::from_value(json!({ "className": "dark", "interactive": false }))
                .expect("valid options");
        assert_eq!(options.class_name, "dark");
        assert!(!options.interactive);
        assert_eq!(options.numbering_start, 1);
    }
}
