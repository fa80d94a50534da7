//! Ordered deep merge of YAML documents.
//!
//! Layers are merged in order, later layers overriding earlier ones:
//!
//! - mappings merge recursively, key by key, keeping first-seen key order
//! - lists are replaced, or appended to under [`MergePolicy::Append`]
//! - under [`MergePolicy::AppendByKey`], a mapping list item whose key field
//!   matches an existing item is merged into it instead of appended
//! - everything else is replaced
//!
//! Store keys are plain strings without `.`, so that a dotted path such as
//! `maps.labels.axis` addresses exactly one value. The body of a `map` field
//! is data (its keys are color tokens or numbers) and is not checked.

use serde_yaml::{Mapping, Value};

use crate::error::{ConfigError, ConfigResult};

/// Field whose contents are map data rather than store keys.
pub const MAP_FIELD: &str = "map";

/// How lists are combined by [`deep_merge`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Later lists replace earlier ones.
    #[default]
    Replace,
    /// Later list items are appended.
    Append,
    /// Mapping items sharing the named field's value are merged in place;
    /// other items are appended.
    AppendByKey(String),
}

impl MergePolicy {
    fn appends(&self) -> bool {
        !matches!(self, Self::Replace)
    }
}

/// Merges `origin` into `destination`.
///
/// ```rust
/// use lutmap_config::{deep_merge, MergePolicy};
///
/// let mut base: serde_yaml::Value = serde_yaml::from_str("a: {x: 1, y: 2}").unwrap();
/// let over: serde_yaml::Value = serde_yaml::from_str("a: {y: 3}").unwrap();
/// deep_merge(&mut base, over, &MergePolicy::Replace);
/// assert_eq!(base["a"]["x"], 1);
/// assert_eq!(base["a"]["y"], 3);
/// ```
pub fn deep_merge(destination: &mut Value, origin: Value, policy: &MergePolicy) {
    match (destination, origin) {
        (Value::Mapping(dest), Value::Mapping(origin)) => merge_mappings(dest, origin, policy),
        (Value::Sequence(dest), Value::Sequence(origin)) if policy.appends() => {
            append_items(dest, origin, policy)
        }
        (slot, value) => *slot = value,
    }
}

fn merge_mappings(dest: &mut Mapping, origin: Mapping, policy: &MergePolicy) {
    for (key, value) in origin {
        match dest.get_mut(&key) {
            Some(existing) => deep_merge(existing, value, policy),
            None => {
                dest.insert(key, value);
            }
        }
    }
}

fn append_items(dest: &mut Vec<Value>, origin: Vec<Value>, policy: &MergePolicy) {
    let MergePolicy::AppendByKey(field) = policy else {
        dest.extend(origin);
        return;
    };
    for item in origin {
        let Some(id) = item.get(field.as_str()).cloned() else {
            dest.push(item);
            continue;
        };
        let mut merged = false;
        for existing in dest.iter_mut().filter(|e| e.get(field.as_str()) == Some(&id)) {
            deep_merge(existing, item.clone(), policy);
            merged = true;
        }
        if !merged {
            dest.push(item);
        }
    }
}

/// Merges layers in order into one document.
///
/// Every layer is checked with [`validate_keys`] first.
pub fn merge_layers(layers: impl IntoIterator<Item = Value>, policy: &MergePolicy) -> ConfigResult<Value> {
    let mut merged = Value::Mapping(Mapping::new());
    for layer in layers {
        validate_keys(&layer)?;
        deep_merge(&mut merged, layer, policy);
    }
    Ok(merged)
}

/// Checks that every store key is a string without `.`.
///
/// # Errors
///
/// [`ConfigError::InvalidKey`] naming the first offending key.
pub fn validate_keys(value: &Value) -> ConfigResult<()> {
    match value {
        Value::Mapping(mapping) => {
            for (key, child) in mapping {
                let name = match key {
                    Value::String(s) if !s.contains('.') => s.as_str(),
                    other => {
                        return Err(ConfigError::InvalidKey {
                            key: describe(other),
                        });
                    }
                };
                if name != MAP_FIELD {
                    validate_keys(child)?;
                }
            }
            Ok(())
        }
        Value::Sequence(items) => items.iter().try_for_each(validate_keys),
        Value::Tagged(tagged) => validate_keys(&tagged.value),
        _ => Ok(()),
    }
}

/// Follows a dotted path through mappings (and list indices).
///
/// ```rust
/// use lutmap_config::lookup;
///
/// let doc: serde_yaml::Value = serde_yaml::from_str("maps: {labels: {axis: [-1]}}").unwrap();
/// assert_eq!(lookup(&doc, "maps.labels.axis.0").unwrap(), &serde_yaml::Value::from(-1));
/// assert!(lookup(&doc, "maps.missing").is_none());
/// ```
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').filter(|s| !s.is_empty()).try_fold(value, |node, segment| match node {
        Value::Mapping(mapping) => mapping.get(segment),
        Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn describe(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_nested_merge_keeps_order() {
        let mut base = yaml("b: 1\na: {x: 1}\n");
        deep_merge(&mut base, yaml("a: {y: 2}\nc: 3\n"), &MergePolicy::Replace);
        let keys: Vec<_> = base.as_mapping().unwrap().keys().map(|k| k.as_str().unwrap()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(base["a"], yaml("{x: 1, y: 2}"));
    }

    #[test]
    fn test_list_policies() {
        let base = yaml("l: [1, 2]");

        let mut replaced = base.clone();
        deep_merge(&mut replaced, yaml("l: [3]"), &MergePolicy::Replace);
        assert_eq!(replaced["l"], yaml("[3]"));

        let mut appended = base.clone();
        deep_merge(&mut appended, yaml("l: [3]"), &MergePolicy::Append);
        assert_eq!(appended["l"], yaml("[1, 2, 3]"));
    }

    #[test]
    fn test_append_by_key() {
        let mut base = yaml("items: [{name: a, v: 1}, {name: b, v: 2}]");
        let over = yaml("items: [{name: b, v: 9, w: 1}, {name: c, v: 3}, 7]");
        deep_merge(&mut base, over, &MergePolicy::AppendByKey("name".into()));
        assert_eq!(
            base["items"],
            yaml("[{name: a, v: 1}, {name: b, v: 9, w: 1}, {name: c, v: 3}, 7]")
        );
    }

    #[test]
    fn test_append_policy_reaches_nested_lists() {
        let mut base = yaml("outer: {inner: [1]}");
        deep_merge(&mut base, yaml("outer: {inner: [2]}"), &MergePolicy::Append);
        assert_eq!(base["outer"]["inner"], yaml("[1, 2]"));
    }

    #[test]
    fn test_dotted_keys_rejected() {
        let err = validate_keys(&yaml("a: {b.c: 1}")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { key } if key == "b.c"));

        let err = validate_keys(&yaml("1: x")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { .. }));

        // map bodies hold data keys
        validate_keys(&yaml("map: {grey.5: 1, 0.5: 2}")).unwrap();
    }

    #[test]
    fn test_merge_layers() {
        let merged = merge_layers([yaml("a: 1"), yaml("b: 2"), yaml("a: 3")], &MergePolicy::Replace).unwrap();
        assert_eq!(merged, yaml("a: 3\nb: 2\n"));
        assert!(merge_layers([yaml("x.y: 1")], &MergePolicy::Replace).is_err());
    }
}
