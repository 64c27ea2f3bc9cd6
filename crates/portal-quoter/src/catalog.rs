//! Local model catalog used when building quotes.
//!
//! A catalog file is a JSON object of buckets, each an array of model
//! objects. Buckets are flattened in file order.

use crate::error::{PortalError, Result};
use crate::records::{value_to_id, LineItem};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Field matched by [`Catalog::filter`] when none is given.
pub const DEFAULT_FILTER_FIELD: &str = "description";

/// Fields totalled by [`Catalog::filter_and_sum`] when none are given.
pub const DEFAULT_SUM_FIELDS: [&str; 2] = ["IA", "FA"];

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    models: Vec<Value>,
}

impl Catalog {
    /// Load and flatten a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let data: Value = serde_json::from_str(&text)?;
        let catalog = Self::from_value(data)
            .map_err(|detail| PortalError::shape(&path.display().to_string(), detail))?;
        info!(path = %path.display(), models = catalog.len(), "loaded model catalog");
        Ok(catalog)
    }

    /// Flatten `{bucket: [model, ...], ...}`.
    pub fn from_value(data: Value) -> std::result::Result<Self, String> {
        let Value::Object(buckets) = data else {
            return Err("catalog must be an object of model arrays".to_string());
        };

        let mut models = Vec::new();
        for (bucket, entries) in buckets {
            match entries {
                Value::Array(entries) => models.extend(entries),
                _ => return Err(format!("bucket '{bucket}' is not an array")),
            }
        }
        Ok(Self { models })
    }

    pub fn models(&self) -> &[Value] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Model with the given id.
    pub fn find(&self, model_id: &str) -> Option<&Value> {
        self.models
            .iter()
            .find(|m| m.get("id").and_then(value_to_id).as_deref() == Some(model_id))
    }

    /// Models whose `field` matches any include pattern and no exclude
    /// pattern. Patterns match the whole value, case-insensitively; `*`
    /// matches any run of characters. No include patterns selects nothing.
    pub fn filter(&self, include: &[&str], exclude: &[&str], field: Option<&str>) -> Result<Vec<&Value>> {
        let field = field.unwrap_or(DEFAULT_FILTER_FIELD);
        let Some(include) = wildcard_regex(include)? else {
            return Ok(Vec::new());
        };
        let exclude = wildcard_regex(exclude)?;

        let selected: Vec<&Value> = self
            .models
            .iter()
            .filter(|model| {
                let Some(text) = field_text(model, field) else {
                    return false;
                };
                include.is_match(&text) && !exclude.as_ref().is_some_and(|rx| rx.is_match(&text))
            })
            .collect();
        debug!(field, matched = selected.len(), "filtered catalog");
        Ok(selected)
    }

    /// [`filter`](Self::filter), plus the total of each of `sum_fields`
    /// over the matches (`IA` and `FA` when empty). Every requested field
    /// has an entry; values that are not JSON numbers count as zero.
    pub fn filter_and_sum(
        &self,
        include: &[&str],
        exclude: &[&str],
        field: Option<&str>,
        sum_fields: &[&str],
    ) -> Result<(Vec<&Value>, BTreeMap<String, f64>)> {
        let selected = self.filter(include, exclude, field)?;
        let sum_fields = if sum_fields.is_empty() {
            &DEFAULT_SUM_FIELDS[..]
        } else {
            sum_fields
        };

        let sums: BTreeMap<String, f64> = sum_fields
            .iter()
            .map(|&name| {
                let total: f64 = selected
                    .iter()
                    .filter_map(|model| model.get(name).and_then(Value::as_f64))
                    .sum();
                (name.to_string(), total)
            })
            .collect();
        Ok((selected, sums))
    }

    /// Ids from `model_ids` that are not in the catalog, in input order.
    pub fn validate_model_ids<'a, S: AsRef<str>>(&self, model_ids: &'a [S]) -> Vec<&'a str> {
        let known: HashSet<String> = self
            .models
            .iter()
            .filter_map(|m| m.get("id").and_then(value_to_id))
            .collect();
        model_ids
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| !known.contains(*id))
            .collect()
    }
}

/// Sum of price × quantity over the lines.
pub fn total_value(lines: &[LineItem]) -> f64 {
    lines.iter().map(LineItem::value).sum()
}

fn field_text(model: &Value, field: &str) -> Option<String> {
    match model.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// One anchored, case-insensitive alternation of the non-blank patterns.
fn wildcard_regex(patterns: &[&str]) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| format!("^{}$", regex::escape(p).replace(r"\*", ".*")))
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }

    RegexBuilder::new(&alternatives.join("|"))
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| PortalError::InvalidArgument(format!("filter pattern: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn catalog() -> Catalog {
        Catalog::from_value(json!({
            "sensors": [
                {"id": "m1", "modelNumber": "E3Z-D61", "description": "Photoelectric sensor, diffuse"},
                {"id": "m2", "modelNumber": "E3Z-T61", "description": "Photoelectric sensor, through-beam"}
            ],
            "relays": [
                {"id": 3, "modelNumber": "G2R-1", "description": "General purpose relay"},
                {"id": "m4", "modelNumber": "G2R-2"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_flatten_keeps_bucket_order() {
        let cat = catalog();
        assert_eq!(cat.len(), 4);
        assert_eq!(cat.models()[2]["modelNumber"], "G2R-1");
        assert!(cat.find("3").is_some());
        assert!(cat.find("zz").is_none());
    }

    #[test]
    fn test_from_value_rejects_bad_shapes() {
        assert!(Catalog::from_value(json!([1, 2])).is_err());
        assert!(Catalog::from_value(json!({"a": {"b": 1}})).is_err());
    }

    #[test]
    fn test_filter_wildcards() {
        let cat = catalog();
        let hits = cat.filter(&["photoelectric*"], &[], None).unwrap();
        assert_eq!(hits.len(), 2);

        let hits = cat.filter(&["*sensor*"], &["*through-beam"], None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["id"], "m1");

        let hits = cat.filter(&["g2r-*"], &[], Some("modelNumber")).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_filter_is_anchored_and_literal() {
        let cat = catalog();
        assert!(cat.filter(&["sensor"], &[], None).unwrap().is_empty());
        assert!(cat.filter(&["E3Z.D61"], &[], Some("modelNumber")).unwrap().is_empty());
        assert!(cat.filter(&["  ", ""], &[], None).unwrap().is_empty());
    }

    #[test]
    fn test_filter_and_sum_columns() {
        let cat = Catalog::from_value(json!({
            "io": [
                {"id": "a", "description": "Input card", "IA": 2, "FA": 1.5, "note": "x"},
                {"id": "b", "description": "Input module", "IA": 3, "FA": "n/a", "note": 4},
                {"id": "c", "description": "Output card", "IA": 100, "FA": 100}
            ]
        }))
        .unwrap();

        let (hits, sums) = cat.filter_and_sum(&["input*"], &[], None, &[]).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(sums.len(), 2);
        assert_eq!(sums["IA"], 5.0);
        assert_eq!(sums["FA"], 1.5);

        let (_, sums) = cat.filter_and_sum(&["input*"], &[], None, &["note", "missing"]).unwrap();
        assert_eq!(sums["note"], 4.0);
        assert_eq!(sums["missing"], 0.0);

        let (hits, sums) = cat.filter_and_sum(&[], &[], None, &[]).unwrap();
        assert!(hits.is_empty());
        assert_eq!(sums["IA"], 0.0);
    }

    #[test]
    fn test_validate_model_ids() {
        let cat = catalog();
        let ids = ["m1", "3", "nope", "m4"];
        assert_eq!(cat.validate_model_ids(&ids), vec!["nope"]);
        assert_eq!(Catalog::default().validate_model_ids(&ids).len(), 4);
    }

    #[test]
    fn test_total_value() {
        let lines = vec![LineItem::new("a", 10.0, 3, 1), LineItem::new("b", 2.5, 2, 1)];
        assert_eq!(total_value(&lines), 35.0);
        assert_eq!(total_value(&[]), 0.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": [{{"id": "x"}}], "b": [{{"id": "y"}}]}}"#).unwrap();
        let cat = Catalog::load(file.path()).unwrap();
        assert_eq!(cat.len(), 2);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "[]").unwrap();
        assert!(matches!(
            Catalog::load(bad.path()),
            Err(PortalError::UnexpectedShape { .. })
        ));
    }
}
