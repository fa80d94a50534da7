//! CLI command implementations

pub mod color;
pub mod inspect;
pub mod lookup;

use std::fmt::Display;

use anyhow::{Context, Result};
use lutmap_config::{MapDocument, MapLibrary, MergePolicy};
use tracing::debug;

use crate::MapSource;

/// Runs `$body` with `$S` bound to the Rust type of an [`ElementType`].
///
/// [`ElementType`]: lutmap_core::ElementType
macro_rules! with_source_type {
    ($dtype:expr, $S:ident => $body:expr) => {
        match $dtype {
            lutmap_core::ElementType::U8 => {
                type $S = u8;
                $body
            }
            lutmap_core::ElementType::U16 => {
                type $S = u16;
                $body
            }
            lutmap_core::ElementType::U32 => {
                type $S = u32;
                $body
            }
            lutmap_core::ElementType::I16 => {
                type $S = i16;
                $body
            }
            lutmap_core::ElementType::I32 => {
                type $S = i32;
                $body
            }
            lutmap_core::ElementType::I64 => {
                type $S = i64;
                $body
            }
            lutmap_core::ElementType::F16 => {
                type $S = half::f16;
                $body
            }
            lutmap_core::ElementType::F32 => {
                type $S = f32;
                $body
            }
            lutmap_core::ElementType::F64 => {
                type $S = f64;
                $body
            }
        }
    };
}
pub(crate) use with_source_type;

/// Load the selected map from one or more layered documents
pub fn load_document(source: &MapSource) -> Result<MapDocument> {
    let policy = match source.append.as_deref() {
        None => MergePolicy::Replace,
        Some("") => MergePolicy::Append,
        Some(field) => MergePolicy::AppendByKey(field.to_string()),
    };
    let library = MapLibrary::from_files(&source.documents, &policy)
        .with_context(|| format!("Failed to load: {}", describe_paths(source)))?;

    let document = match &source.name {
        Some(name) => library.get(name),
        None => library.document(),
    }
    .with_context(|| match &source.name {
        Some(name) => format!("Failed to read map '{name}'"),
        None => "Failed to read map (use --name to pick a section)".to_string(),
    })?;

    debug!(entries = document.spec.len(), dtype = %source.dtype, "map document loaded");
    Ok(document)
}

fn describe_paths(source: &MapSource) -> String {
    source
        .documents
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format values as `(a, b, c)`
pub fn format_tuple<T: Display>(values: impl IntoIterator<Item = T>) -> String {
    let parts: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tuple() {
        assert_eq!(format_tuple([1, 2, 3]), "(1, 2, 3)");
        assert_eq!(format_tuple([0.5f64]), "(0.5)");
        assert_eq!(format_tuple(Vec::<u8>::new()), "()");
    }
}
