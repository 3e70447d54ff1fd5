//! Answers and the context templates are rendered against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::DataValue;

/// Resolved answers: variable name → value.
///
/// Sorted by name so serialization is stable; declaration order is kept by
/// the template's variable list, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataContext(BTreeMap<String, DataValue>);

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<DataValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DataValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of `self`; `other` wins.
    pub fn merged(mut self, other: &DataContext) -> Self {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }

    /// Parse `KEY=VALUE` pairs from the command line. Values stay strings;
    /// they are coerced once the declared type is known.
    pub fn parse_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ctx = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected KEY=VALUE, got '{pair}'"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("empty variable name in '{pair}'"));
            }
            ctx.insert(key, value);
        }
        Ok(ctx)
    }
}

impl FromIterator<(String, DataValue)> for DataContext {
    fn from_iter<T: IntoIterator<Item = (String, DataValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Built-in variables every template can reference.
pub const BUILTIN_TEMPLATE_ID: &str = "_template_id";
pub const BUILTIN_TEMPLATE_VERSION: &str = "_template_version";
pub const BUILTIN_RECAST_VERSION: &str = "_recast_version";

/// Data context plus built-ins, as handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext {
    values: BTreeMap<String, DataValue>,
}

impl RenderContext {
    pub fn new(data: &DataContext) -> Self {
        Self {
            values: data.0.clone(),
        }
    }

    pub fn with_builtins(mut self, template_id: &str, template_version: &str) -> Self {
        self.values
            .insert(BUILTIN_TEMPLATE_ID.into(), template_id.into());
        self.values
            .insert(BUILTIN_TEMPLATE_VERSION.into(), template_version.into());
        self.values
            .insert(BUILTIN_RECAST_VERSION.into(), crate::VERSION.into());
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DataValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DataValue)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pairs_keeps_everything_after_first_equals() {
        let ctx = DataContext::parse_pairs(["a=1", "b=x=y", "codecov_token="]).unwrap();
        assert_eq!(ctx.get("a"), Some(&DataValue::from("1")));
        assert_eq!(ctx.get("b"), Some(&DataValue::from("x=y")));
        assert_eq!(ctx.get("codecov_token"), Some(&DataValue::from("")));
    }

    #[test]
    fn parse_pairs_rejects_missing_equals() {
        assert!(DataContext::parse_pairs(["novalue"]).is_err());
        assert!(DataContext::parse_pairs(["=x"]).is_err());
    }

    #[test]
    fn merged_prefers_overlay() {
        let base = DataContext::new().with("a", "old").with("b", true);
        let over = DataContext::new().with("a", "new");
        let merged = base.merged(&over);
        assert_eq!(merged.get("a"), Some(&DataValue::from("new")));
        assert_eq!(merged.get("b"), Some(&DataValue::Bool(true)));
    }

    #[test]
    fn render_context_has_builtins() {
        let ctx = RenderContext::new(&DataContext::new().with("x", 1i64))
            .with_builtins("python-package", "1.2.0");
        assert_eq!(
            ctx.get(BUILTIN_TEMPLATE_ID),
            Some(&DataValue::from("python-package"))
        );
        assert_eq!(ctx.get("x"), Some(&DataValue::Int(1)));
        assert!(ctx.get(BUILTIN_RECAST_VERSION).is_some());
    }

    #[test]
    fn serializes_as_flat_map() {
        let ctx = RenderContext::new(&DataContext::new().with("flag", true).with("n", "x"));
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json, serde_json::json!({"flag": true, "n": "x"}));
    }
}
