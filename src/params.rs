//! Declarative parameter plumbing for annotator stages.
//!
//! Every stage carries a [`ParamMap`]: a name-keyed map of closed
//! [`ParamValue`] variants. Stages never mutate each other's maps; parameter
//! overrides always go through clone-and-merge (see
//! `AnnotatorModel::with_params`), so a fitted pipeline can never observe a
//! half-applied configuration.
//!
//! The dynamic surface ([`ParamsArg`]) accepts a JSON value the way the
//! original binding accepted loosely-typed call arguments: a sequence fans
//! out into one fit per map, a map configures a single fit, and anything
//! else fails fast with `InvalidParameterKind`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PipelineError, PipelineResult};

/// Shared param names used by the annotator layer.
pub mod names {
    pub const INPUT_COLS: &str = "input_cols";
    pub const OUTPUT_COL: &str = "output_col";
    pub const LAZY_ANNOTATOR: &str = "lazy_annotator";
    pub const TRAINING_COLS: &str = "training_cols";
    pub const DIMENSION: &str = "dimension";
    pub const CASE_SENSITIVE: &str = "case_sensitive";
    pub const STORAGE_REF: &str = "storage_ref";
    pub const STORAGE_PATH: &str = "storage_path";
    pub const STORAGE_FORMAT: &str = "storage_format";
    pub const INCLUDE_STORAGE: &str = "include_storage";
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
    StrMap(BTreeMap<String, String>),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::StrList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ParamValue::StrMap(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a JSON value into a param value, if it fits the closed set.
    fn from_json(value: &Value) -> Option<ParamValue> {
        match value {
            Value::Bool(b) => Some(ParamValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ParamValue::Int(i))
                } else {
                    n.as_f64().map(ParamValue::Float)
                }
            }
            Value::String(s) => Some(ParamValue::Str(s.clone())),
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    list.push(item.as_str()?.to_string());
                }
                Some(ParamValue::StrList(list))
            }
            Value::Object(entries) => {
                let mut map = BTreeMap::new();
                for (key, item) in entries {
                    map.insert(key.clone(), item.as_str()?.to_string());
                }
                Some(ParamValue::StrMap(map))
            }
            Value::Null => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::StrList(value)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(value: &[&str]) -> Self {
        ParamValue::StrList(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<BTreeMap<String, String>> for ParamValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        ParamValue::StrMap(value)
    }
}

/// Name-keyed parameter map carried by every stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap {
    values: BTreeMap<String, ParamValue>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, returning `&mut Self` for chaining.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Get a parameter or fall back to the given default.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a ParamValue) -> &'a ParamValue {
        self.values.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of this map: entries in `other` win.
    pub fn merged_with(&self, other: &ParamMap) -> ParamMap {
        let mut merged = self.clone();
        for (name, value) in &other.values {
            merged.values.insert(name.clone(), value.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a param map from a JSON object.
    ///
    /// Fails with `InvalidParameterKind` when the value is not an object or
    /// an entry falls outside the closed [`ParamValue`] set.
    pub fn from_json(value: &Value) -> PipelineResult<ParamMap> {
        let entries = value.as_object().ok_or_else(|| {
            PipelineError::InvalidParameterKind {
                found: json_kind(value).to_string(),
            }
        })?;
        let mut map = ParamMap::new();
        for (name, item) in entries {
            let parsed =
                ParamValue::from_json(item).ok_or_else(|| PipelineError::InvalidParameterKind {
                    found: format!("{} for param '{}'", json_kind(item), name),
                })?;
            map.set(name.clone(), parsed);
        }
        Ok(map)
    }
}

/// The dynamic `params` argument accepted by `fit`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsArg {
    /// Use the stage's current parameter state.
    Current,
    /// Fit a single overridden configuration.
    Single(ParamMap),
    /// Fan out: one fit per map, output order matches input order.
    Multi(Vec<ParamMap>),
}

impl ParamsArg {
    /// Parse the loosely-typed `params` argument.
    ///
    /// - `null` or an empty object means "use current parameter state";
    /// - an object is a single configuration;
    /// - an array is a sequence of configurations (each must be an object);
    /// - anything else fails with `InvalidParameterKind`.
    pub fn from_json(value: &Value) -> PipelineResult<ParamsArg> {
        match value {
            Value::Null => Ok(ParamsArg::Current),
            Value::Object(_) => {
                let map = ParamMap::from_json(value)?;
                if map.is_empty() {
                    Ok(ParamsArg::Current)
                } else {
                    Ok(ParamsArg::Single(map))
                }
            }
            Value::Array(items) => {
                let mut maps = Vec::with_capacity(items.len());
                for item in items {
                    maps.push(ParamMap::from_json(item)?);
                }
                Ok(ParamsArg::Multi(maps))
            }
            other => Err(PipelineError::InvalidParameterKind {
                found: json_kind(other).to_string(),
            }),
        }
    }

    /// Like [`ParamsArg::from_json`] but rejects sequences, for call sites
    /// that only accept a single param map (recursive transform).
    pub fn map_from_json(value: &Value) -> PipelineResult<ParamsArg> {
        match ParamsArg::from_json(value)? {
            ParamsArg::Multi(_) => Err(PipelineError::InvalidParameterKind {
                found: "sequence".to_string(),
            }),
            arg => Ok(arg),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

/// How an external resource file should be consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadAs {
    LineByLine,
    Dataset,
}

impl ReadAs {
    fn as_str(self) -> &'static str {
        match self {
            ReadAs::LineByLine => "LINE_BY_LINE",
            ReadAs::Dataset => "DATASET",
        }
    }
}

/// A resource file consumed at fit time (dictionary, gazetteer, corpus).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalResource {
    pub path: String,
    pub read_as: ReadAs,
    pub options: BTreeMap<String, String>,
}

impl ExternalResource {
    pub fn new(path: impl Into<String>, read_as: ReadAs) -> Self {
        Self {
            path: path.into(),
            read_as,
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Flatten into a param value the engine can consume: the path, the
    /// read mode, and every option prefixed with `option.`.
    pub fn to_param(&self) -> ParamValue {
        let mut map = BTreeMap::new();
        map.insert("path".to_string(), self.path.clone());
        map.insert("read_as".to_string(), self.read_as.as_str().to_string());
        for (key, value) in &self.options {
            map.insert(format!("option.{}", key), value.clone());
        }
        ParamValue::StrMap(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_and_defaults() {
        let mut params = ParamMap::new();
        params
            .set(names::OUTPUT_COL, "token")
            .set(names::DIMENSION, 100i64)
            .set(names::CASE_SENSITIVE, false);

        assert_eq!(
            params.get(names::OUTPUT_COL).and_then(ParamValue::as_str),
            Some("token")
        );
        assert_eq!(
            params.get(names::DIMENSION).and_then(ParamValue::as_int),
            Some(100)
        );

        let default = ParamValue::Bool(true);
        assert_eq!(params.get_or("missing", &default).as_bool(), Some(true));
        assert_eq!(
            params.get_or(names::CASE_SENSITIVE, &default).as_bool(),
            Some(false)
        );
    }

    #[test]
    fn merged_with_overrides_without_mutating_base() {
        let mut base = ParamMap::new();
        base.set("a", "base").set("b", "kept");
        let mut overlay = ParamMap::new();
        overlay.set("a", "override");

        let merged = base.merged_with(&overlay);
        assert_eq!(merged.get("a").and_then(ParamValue::as_str), Some("override"));
        assert_eq!(merged.get("b").and_then(ParamValue::as_str), Some("kept"));
        // base untouched
        assert_eq!(base.get("a").and_then(ParamValue::as_str), Some("base"));
    }

    #[test]
    fn params_arg_from_map_and_sequence() {
        let single = ParamsArg::from_json(&json!({"output_col": "lemma"})).unwrap();
        match single {
            ParamsArg::Single(map) => {
                assert_eq!(map.get("output_col").and_then(ParamValue::as_str), Some("lemma"))
            }
            other => panic!("expected Single, got {:?}", other),
        }

        let multi =
            ParamsArg::from_json(&json!([{"dimension": 50}, {"dimension": 100}])).unwrap();
        match multi {
            ParamsArg::Multi(maps) => {
                assert_eq!(maps.len(), 2);
                assert_eq!(maps[0].get("dimension").and_then(ParamValue::as_int), Some(50));
                assert_eq!(maps[1].get("dimension").and_then(ParamValue::as_int), Some(100));
            }
            other => panic!("expected Multi, got {:?}", other),
        }
    }

    #[test]
    fn empty_map_and_null_mean_current_state() {
        assert_eq!(ParamsArg::from_json(&json!({})).unwrap(), ParamsArg::Current);
        assert_eq!(ParamsArg::from_json(&Value::Null).unwrap(), ParamsArg::Current);
    }

    #[test]
    fn empty_sequence_is_an_empty_fan_out() {
        assert_eq!(
            ParamsArg::from_json(&json!([])).unwrap(),
            ParamsArg::Multi(Vec::new())
        );
    }

    #[test]
    fn scalar_params_fail_with_invalid_parameter_kind() {
        let err = ParamsArg::from_json(&json!("bad")).unwrap_err();
        match err {
            PipelineError::InvalidParameterKind { found } => assert_eq!(found, "string"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn map_from_json_rejects_sequences() {
        let err = ParamsArg::map_from_json(&json!([{"a": "b"}])).unwrap_err();
        match err {
            PipelineError::InvalidParameterKind { found } => assert_eq!(found, "sequence"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn external_resource_flattens_to_str_map() {
        let resource = ExternalResource::new("lemmas.txt", ReadAs::LineByLine)
            .with_option("key_delimiter", "->")
            .with_option("value_delimiter", "\t");
        let param = resource.to_param();
        let map = param.as_str_map().unwrap();
        assert_eq!(map.get("path").map(String::as_str), Some("lemmas.txt"));
        assert_eq!(map.get("read_as").map(String::as_str), Some("LINE_BY_LINE"));
        assert_eq!(map.get("option.key_delimiter").map(String::as_str), Some("->"));
    }
}
