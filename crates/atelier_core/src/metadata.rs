//! Asset metadata, partial updates, and the validation policy applied to both.

use atelier_error::{ValidationError, ValidationErrorKind};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Descriptive metadata owned by an asset (not by any single version).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Human-readable title (1-256 characters under the default policy)
    pub title: String,
    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tag set; order-independent and duplicate-free
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Free-form custom key/value map
    #[serde(default)]
    pub custom: Map<String, Value>,
}

impl AssetMetadata {
    /// Metadata with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the tag set.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the custom map.
    pub fn with_custom(mut self, custom: Map<String, Value>) -> Self {
        self.custom = custom;
        self
    }

    /// Whether every tag in `required` is present.
    pub fn has_all_tags<'a>(&self, required: impl IntoIterator<Item = &'a String>) -> bool {
        required.into_iter().all(|tag| self.tags.contains(tag))
    }

    /// Case-insensitive substring match against title and description.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Partial metadata update.
///
/// Only supplied fields change. `tags` and `custom` replace wholesale when
/// supplied; `description: Some(None)` clears the description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetadataPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description, or `Some(None)` to clear it
    #[serde(default)]
    pub description: Option<Option<String>>,
    /// Replacement tag set
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
    /// Replacement custom map
    #[serde(default)]
    pub custom: Option<Map<String, Value>>,
}

impl MetadataPatch {
    /// A patch that only replaces the tag set.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: Some(tags.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.custom.is_none()
    }

    /// Apply the patch to `current`, producing the merged metadata.
    pub fn apply(&self, current: &AssetMetadata) -> AssetMetadata {
        AssetMetadata {
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            description: match &self.description {
                Some(replacement) => replacement.clone(),
                None => current.description.clone(),
            },
            tags: self.tags.clone().unwrap_or_else(|| current.tags.clone()),
            custom: self.custom.clone().unwrap_or_else(|| current.custom.clone()),
        }
    }
}

/// Split a comma-separated tag list, trimming whitespace and dropping empties.
///
/// ```
/// let tags = atelier_core::parse_tag_list(" brand, logo,,brand ");
/// assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["brand", "logo"]);
/// ```
pub fn parse_tag_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Limits enforced on metadata before it is stored.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct MetadataPolicy {
    /// Maximum title length in characters (minimum is always 1)
    #[serde(default = "default_title_max")]
    title_max: usize,

    /// Maximum description length in characters
    #[serde(default = "default_description_max")]
    description_max: usize,

    /// Maximum number of tags per asset
    #[serde(default = "default_max_tags")]
    max_tags: usize,

    /// Maximum tag length in characters (minimum is always 1)
    #[serde(default = "default_tag_max")]
    tag_max: usize,

    /// Maximum nesting depth of the custom map (the map itself is depth 1)
    #[serde(default = "default_custom_max_depth")]
    custom_max_depth: usize,

    /// Maximum number of keys across all nested objects of the custom map
    #[serde(default = "default_custom_max_keys")]
    custom_max_keys: usize,

    /// Maximum serialized size of the custom map in bytes
    #[serde(default = "default_custom_max_bytes")]
    custom_max_bytes: usize,
}

fn default_title_max() -> usize {
    256
}

fn default_description_max() -> usize {
    1024
}

fn default_max_tags() -> usize {
    64
}

fn default_tag_max() -> usize {
    64
}

fn default_custom_max_depth() -> usize {
    4
}

fn default_custom_max_keys() -> usize {
    128
}

fn default_custom_max_bytes() -> usize {
    16 * 1024
}

impl Default for MetadataPolicy {
    fn default() -> Self {
        Self {
            title_max: default_title_max(),
            description_max: default_description_max(),
            max_tags: default_max_tags(),
            tag_max: default_tag_max(),
            custom_max_depth: default_custom_max_depth(),
            custom_max_keys: default_custom_max_keys(),
            custom_max_bytes: default_custom_max_bytes(),
        }
    }
}

impl MetadataPolicy {
    /// Check `metadata` against every limit.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a [`ValidationError`].
    ///
    /// ```
    /// use atelier_core::{AssetMetadata, MetadataPolicy};
    ///
    /// let policy = MetadataPolicy::default();
    /// assert!(policy.validate(&AssetMetadata::new("Logo")).is_ok());
    /// assert!(policy.validate(&AssetMetadata::new("")).is_err());
    /// ```
    pub fn validate(&self, metadata: &AssetMetadata) -> Result<(), ValidationError> {
        check_length("title", &metadata.title, 1, self.title_max)?;

        if let Some(description) = &metadata.description {
            check_length("description", description, 0, self.description_max)?;
        }

        if metadata.tags.len() > self.max_tags {
            return Err(ValidationError::out_of_range(
                "tags",
                metadata.tags.len() as u64,
                0,
                self.max_tags as u64,
            ));
        }
        for tag in &metadata.tags {
            check_length("tag", tag, 1, self.tag_max)?;
            if tag.contains(',') || tag.trim() != tag {
                return Err(ValidationError::invalid(
                    "tag",
                    format!("'{}' must not contain commas or surrounding whitespace", tag),
                ));
            }
        }

        self.validate_custom(&metadata.custom)
    }

    fn validate_custom(&self, custom: &Map<String, Value>) -> Result<(), ValidationError> {
        let (depth, keys) = measure_object(custom);
        if depth > self.custom_max_depth {
            return Err(ValidationError::out_of_range(
                "custom.depth",
                depth as u64,
                1,
                self.custom_max_depth as u64,
            ));
        }
        if keys > self.custom_max_keys {
            return Err(ValidationError::out_of_range(
                "custom.keys",
                keys as u64,
                0,
                self.custom_max_keys as u64,
            ));
        }

        let encoded = serde_json::to_vec(custom)
            .map_err(|e| ValidationError::invalid("custom", e.to_string()))?;
        if encoded.len() > self.custom_max_bytes {
            return Err(ValidationError::out_of_range(
                "custom.bytes",
                encoded.len() as u64,
                0,
                self.custom_max_bytes as u64,
            ));
        }
        Ok(())
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        if min > 0 && len == 0 {
            return Err(ValidationError::new(ValidationErrorKind::MissingField(
                field.to_string(),
            )));
        }
        return Err(ValidationError::out_of_range(
            field,
            len as u64,
            min as u64,
            max as u64,
        ));
    }
    Ok(())
}

/// Returns `(depth, total_keys)` for a JSON object.
fn measure_object(object: &Map<String, Value>) -> (usize, usize) {
    object
        .values()
        .map(measure_value)
        .fold((1, object.len()), |(depth, keys), (d, k)| {
            (depth.max(d + 1), keys + k)
        })
}

fn measure_value(value: &Value) -> (usize, usize) {
    match value {
        Value::Object(inner) => measure_object(inner),
        Value::Array(items) => items
            .iter()
            .map(measure_value)
            .fold((1, 0), |(depth, keys), (d, k)| (depth.max(d + 1), keys + k)),
        _ => (0, 0),
    }
}
