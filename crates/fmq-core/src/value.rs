//! Metadata values read from frontmatter.
//!
//! Frontmatter is untyped YAML. Instead of passing raw YAML around, every
//! value is decoded once into the closed [`Value`] variant; each consumer
//! (cell rendering, date detection, indexing, expression evaluation) then
//! applies its own explicit coercion.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Metadata of a single document: frontmatter key to value.
pub type MetadataRecord = BTreeMap<String, Value>;

/// A frontmatter value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Sequence(Vec<Value>),
    Record(MetadataRecord),
    /// Missing key, YAML `null`, or an out-of-range lookup.
    #[default]
    Absent,
}

impl Value {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Truthiness as used by `where` conditions.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::String(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
            Self::Sequence(_) | Self::Record(_) => true,
            Self::Absent => false,
        }
    }

    /// Name of the value's type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Sequence(_) => "array",
            Self::Record(_) => "object",
            Self::Absent => "undefined",
        }
    }

    /// Numeric coercion. Values with no numeric reading become `NaN`.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::String(s) => string_to_number(s),
            Self::Sequence(_) | Self::Record(_) => string_to_number(&self.to_string()),
            Self::Absent => f64::NAN,
        }
    }

    /// Positional lookup into a sequence. Anything else yields `None`.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Sequence(items) => items.get(index),
            _ => None,
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    match t {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts "inf" and "nan" spellings that should not count as numbers
        _ if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => t.parse().unwrap_or(f64::NAN),
    }
}

/// Render a number the way it is written in a document: `2`, not `2.0`.
///
/// Magnitudes of `1e21` and above, or below `1e-6`, use exponent form with
/// an explicit sign (`1e+21`, `1e-7`).
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exp = format!("{n:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        n.to_string()
    }
}

/// The natural string form: sequences join with `,`, records render as
/// JSON, and an absent value prints as `undefined`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_absent() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Self::Record(record) => {
                let json =
                    serde_json::to_string(record).unwrap_or_else(|_| "[object Object]".to_string());
                f.write_str(&json)
            }
            Self::Absent => f.write_str("undefined"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(v: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;
        match v {
            Yaml::Null => Self::Absent,
            Yaml::Bool(b) => Self::Bool(b),
            Yaml::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Yaml::String(s) => Self::String(s),
            Yaml::Sequence(items) => Self::Sequence(items.into_iter().map(Value::from).collect()),
            Yaml::Mapping(mapping) => Self::Record(record_from_mapping(mapping)),
            Yaml::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

/// Decode a YAML mapping. Scalar keys are stringified; keys that are
/// themselves collections are dropped.
#[must_use]
pub fn record_from_mapping(mapping: serde_yaml::Mapping) -> MetadataRecord {
    mapping
        .into_iter()
        .filter_map(|(key, value)| {
            let key = match key {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => "null".to_string(),
                _ => return None,
            };
            Some((key, Value::from(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(0.0).to_string(), "0");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e22), "-1.5e+22");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000_001), "0.000001");
    }

    #[test]
    fn zero_and_false_render_literally() {
        assert_eq!(Value::Number(0.0).to_string(), "0");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }

    #[test]
    fn sequences_join_with_commas() {
        let v = Value::from(vec![Value::from("a"), Value::Number(1.0), Value::Absent]);
        assert_eq!(v.to_string(), "a,1,");
    }

    #[test]
    fn records_render_as_json() {
        let mut record = MetadataRecord::new();
        record.insert("k".to_string(), Value::from("v"));
        assert_eq!(Value::Record(record).to_string(), r#"{"k":"v"}"#);
    }

    #[test]
    fn truthiness_follows_scripting_conventions() {
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::Sequence(vec![]).is_truthy());
        assert!(!Value::Absent.is_truthy());
    }

    #[test]
    fn numeric_coercion() {
        assert!((Value::from(" 42 ").to_number() - 42.0).abs() < f64::EPSILON);
        assert!(Value::from("").to_number().abs() < f64::EPSILON);
        assert!(Value::from("inf").to_number().is_nan());
        assert!(Value::from("abc").to_number().is_nan());
        assert!((Value::Bool(true).to_number() - 1.0).abs() < f64::EPSILON);
        assert!(Value::Absent.to_number().is_nan());
        let single = Value::from(vec![Value::Number(7.0)]);
        assert!((single.to_number() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decodes_yaml_scalars_and_collections() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("a: 1\nb: [x, y]\nc: ~\nd: {e: true}\n1: one\n").unwrap();
        let serde_yaml::Value::Mapping(mapping) = yaml else {
            panic!("expected mapping");
        };
        let record = record_from_mapping(mapping);
        assert_eq!(record["a"], Value::Number(1.0));
        assert_eq!(
            record["b"],
            Value::Sequence(vec![Value::from("x"), Value::from("y")])
        );
        assert_eq!(record["c"], Value::Absent);
        assert!(matches!(record["d"], Value::Record(_)));
        assert_eq!(record["1"], Value::from("one"));
    }

    #[test]
    fn element_lookup_only_indexes_sequences() {
        let seq = Value::from(vec![Value::from("a")]);
        assert_eq!(seq.element(0), Some(&Value::from("a")));
        assert_eq!(seq.element(1), None);
        assert_eq!(Value::from("abc").element(0), None);
    }
}
