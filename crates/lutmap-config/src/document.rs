//! Map documents: map specifications with their build options.
//!
//! # Format
//!
//! ```yaml
//! map:                      # mapping, or a list of [key, value] pairs
//!   [0, 0, 255]: 1
//!   sky_blue: 2
//!   "255, 0, 0": 3          # numeric tuple spelled as a string (JSON)
//! axis: -1                  # int or list of ints; leading axes if absent
//! sampling: nearest         # number, list, auto, gcd, nearest
//! default: 0
//! keep_dims: false
//! channel_order: rgb        # rgb or bgr (default)
//! max_table_len: 1000000    # slot cap for sparse keys
//! ```
//!
//! A library document holds several such sections under `maps`, keyed by
//! name. Top-level fields other than `map` act as defaults for every
//! section.

use std::path::{Path, PathBuf};

use lutmap_color::ChannelOrder;
use lutmap_core::{AxisSpec, Element, MapSpec, MapValue, Sampling};
use lutmap_lut::{build_transform, BuildOptions, CompiledTransform};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{lookup, merge_layers, validate_keys, MergePolicy, MAP_FIELD};

/// Raw document fields as deserialized by serde.
#[derive(Debug, Deserialize)]
struct RawMapDocument {
    map: Option<Value>,
    axis: Option<Value>,
    sampling: Option<Value>,
    default: Option<Value>,
    keep_dims: Option<bool>,
    channel_order: Option<String>,
    max_table_len: Option<usize>,
}

/// A map specification with the options to build it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDocument {
    /// Entries in document order.
    pub spec: MapSpec,
    /// Build options from the document.
    pub options: BuildOptions,
}

impl MapDocument {
    /// Loads a single-map document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let value = read_value(path.as_ref())?;
        Self::from_value(value)
    }

    /// Loads a single-map document from YAML (or JSON).
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Converts a parsed document.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        validate_keys(&value)?;
        let raw: RawMapDocument = serde_yaml::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawMapDocument) -> ConfigResult<Self> {
        let map = raw
            .map
            .ok_or_else(|| ConfigError::invalid_field(MAP_FIELD, "missing"))?;
        let spec = parse_map(&map)?;

        let mut options = BuildOptions::new();
        if let Some(axis) = &raw.axis {
            options.axis = parse_axis(axis)?;
        }
        if let Some(sampling) = &raw.sampling {
            options.sampling = parse_sampling(sampling)?;
        }
        if let Some(default) = &raw.default {
            if !default.is_null() {
                options.default = Some(parse_value(default, "default")?);
            }
        }
        if let Some(keep_dims) = raw.keep_dims {
            options.keep_dims = keep_dims;
        }
        if let Some(order) = &raw.channel_order {
            options.channel_order = order.parse::<ChannelOrder>()?;
        }
        if let Some(slots) = raw.max_table_len {
            options.max_table_len = slots;
        }

        debug!(entries = spec.len(), axis = ?options.axis, sampling = %options.sampling, "loaded map document");
        Ok(Self { spec, options })
    }

    /// Builds the transform described by this document.
    pub fn build<S: Element, D: Element>(&self) -> ConfigResult<CompiledTransform<S, D>> {
        Ok(build_transform(&self.spec, &self.options)?)
    }
}

/// A merged store holding named map sections under `maps`.
///
/// ```rust
/// use lutmap_config::MapLibrary;
///
/// let lib = MapLibrary::from_yaml_str(r#"
/// axis: -1
/// maps:
///   labels: {map: {"0, 0, 255": 1}}
///   colors: {map: {1: red}, axis: 0}
/// "#).unwrap();
/// assert_eq!(lib.names(), vec!["labels", "colors"]);
/// assert_eq!(lib.get("labels").unwrap().options.axis, (-1).into());
/// assert_eq!(lib.get("colors").unwrap().options.axis, 0.into());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapLibrary {
    root: Value,
}

impl MapLibrary {
    /// Field holding the named sections.
    pub const MAPS_FIELD: &'static str = "maps";

    /// Loads a library from a file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_value(read_value(path.as_ref())?)
    }

    /// Loads a library from YAML (or JSON).
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Self::from_value(serde_yaml::from_str(yaml)?)
    }

    /// Wraps a parsed document.
    pub fn from_value(root: Value) -> ConfigResult<Self> {
        validate_keys(&root)?;
        Ok(Self { root })
    }

    /// Deep-merges layered documents, later layers overriding earlier ones.
    pub fn from_layers(layers: impl IntoIterator<Item = Value>, policy: &MergePolicy) -> ConfigResult<Self> {
        Ok(Self {
            root: merge_layers(layers, policy)?,
        })
    }

    /// Loads and deep-merges layered files in order.
    pub fn from_files<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>, policy: &MergePolicy) -> ConfigResult<Self> {
        let layers = paths
            .into_iter()
            .map(|p| read_value(p.as_ref()))
            .collect::<ConfigResult<Vec<_>>>()?;
        Self::from_layers(layers, policy)
    }

    /// Merged document.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Value at a dotted path.
    pub fn value(&self, path: &str) -> Option<&Value> {
        lookup(&self.root, path)
    }

    /// Section names in document order.
    pub fn names(&self) -> Vec<&str> {
        self.sections()
            .map(|m| m.keys().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Named section with top-level fields as defaults.
    pub fn get(&self, name: &str) -> ConfigResult<MapDocument> {
        let section = self
            .sections()
            .and_then(|m| m.get(name))
            .and_then(Value::as_mapping)
            .ok_or_else(|| ConfigError::MapNotFound { name: name.into() })?;

        let mut merged = self.shared_fields();
        for (key, value) in section {
            merged.insert(key.clone(), value.clone());
        }
        MapDocument::from_value(Value::Mapping(merged))
    }

    /// The top-level map, or the only section when there is no top-level map.
    pub fn document(&self) -> ConfigResult<MapDocument> {
        if let Some(map) = self.root.get(MAP_FIELD) {
            let mut top = self.shared_fields();
            top.insert(Value::from(MAP_FIELD), map.clone());
            return MapDocument::from_value(Value::Mapping(top));
        }
        match self.names().as_slice() {
            [only] => self.get(only),
            _ => Err(ConfigError::invalid_field(MAP_FIELD, "missing")),
        }
    }

    fn sections(&self) -> Option<&Mapping> {
        self.root.get(Self::MAPS_FIELD).and_then(Value::as_mapping)
    }

    /// Top-level option fields inherited by every section.
    fn shared_fields(&self) -> Mapping {
        const SHARED: [&str; 6] = ["axis", "sampling", "default", "keep_dims", "channel_order", "max_table_len"];
        let mut fields = Mapping::new();
        for name in SHARED {
            if let Some(value) = self.root.get(name) {
                fields.insert(Value::from(name), value.clone());
            }
        }
        fields
    }
}

fn read_value(path: &Path) -> ConfigResult<Value> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: PathBuf::from(path),
        });
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Parses the `map` field.
fn parse_map(map: &Value) -> ConfigResult<MapSpec> {
    let mut spec = MapSpec::new();
    match map {
        Value::Mapping(entries) => {
            for (key, value) in entries {
                spec.push(parse_value(key, "map key")?, parse_value(value, "map value")?);
            }
        }
        Value::Sequence(pairs) => {
            for pair in pairs {
                match pair.as_sequence().map(Vec::as_slice) {
                    Some([key, value]) => {
                        spec.push(parse_value(key, "map key")?, parse_value(value, "map value")?)
                    }
                    _ => {
                        return Err(ConfigError::invalid_field(MAP_FIELD, "list items must be [key, value] pairs"));
                    }
                }
            }
        }
        _ => return Err(ConfigError::invalid_field(MAP_FIELD, "expected a mapping or a list of pairs")),
    }
    if spec.is_empty() {
        return Err(ConfigError::invalid_field(MAP_FIELD, "no entries"));
    }
    Ok(spec)
}

/// Converts one YAML node into a key or value.
fn parse_value(value: &Value, field: &str) -> ConfigResult<MapValue> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(MapValue::Scalar)
            .ok_or_else(|| ConfigError::invalid_field(field, format!("unrepresentable number {n}"))),
        Value::String(s) => Ok(parse_token(s)),
        Value::Sequence(items) => {
            let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
            match numbers {
                Some(values) if !values.is_empty() => Ok(MapValue::Tuple(values)),
                _ => items
                    .iter()
                    .map(|item| parse_value(item, field))
                    .collect::<ConfigResult<Vec<_>>>()
                    .map(MapValue::Nested),
            }
        }
        Value::Tagged(tagged) => parse_value(&tagged.value, field),
        other => Err(ConfigError::invalid_field(field, format!("unsupported value {other:?}"))),
    }
}

/// Numbers and comma-separated tuples spelled as strings become numeric;
/// anything else is a color token.
fn parse_token(token: &str) -> MapValue {
    let trimmed = token.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return MapValue::Scalar(v);
    }
    let inner = trimmed
        .strip_prefix(['(', '['])
        .and_then(|s| s.strip_suffix([')', ']']))
        .unwrap_or(trimmed);
    if inner.contains(',') {
        let parts: Result<Vec<f64>, _> = inner.split(',').map(|p| p.trim().parse::<f64>()).collect();
        if let Ok(values) = parts {
            return MapValue::Tuple(values);
        }
    }
    MapValue::Color(trimmed.to_string())
}

fn parse_axis(axis: &Value) -> ConfigResult<AxisSpec> {
    let as_axis = |v: &Value| v.as_i64().and_then(|i| isize::try_from(i).ok());
    match axis {
        Value::Null => Ok(AxisSpec::Leading),
        Value::Number(_) => as_axis(axis)
            .map(AxisSpec::from)
            .ok_or_else(|| lutmap_core::Error::invalid_axis_spec(format!("{axis:?} is not an integer")).into()),
        Value::Sequence(items) => items
            .iter()
            .map(|v| as_axis(v).ok_or_else(|| lutmap_core::Error::invalid_axis_spec(format!("{v:?} is not an integer"))))
            .collect::<lutmap_core::Result<Vec<isize>>>()
            .map(AxisSpec::Axes)
            .map_err(ConfigError::from),
        other => Err(lutmap_core::Error::invalid_axis_spec(format!("unsupported axis {other:?}")).into()),
    }
}

fn parse_sampling(sampling: &Value) -> ConfigResult<Sampling> {
    match sampling {
        Value::Null => Ok(Sampling::Auto),
        Value::Number(n) => n
            .as_f64()
            .map(Sampling::fixed)
            .ok_or_else(|| lutmap_core::Error::invalid_sampling_mode(n.to_string()).into()),
        Value::String(s) => Ok(s.parse::<Sampling>()?),
        Value::Sequence(items) => items
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .map(Sampling::per_dimension)
            .ok_or_else(|| lutmap_core::Error::invalid_sampling_mode(format!("{sampling:?}")).into()),
        other => Err(lutmap_core::Error::invalid_sampling_mode(format!("{other:?}")).into()),
    }
}
