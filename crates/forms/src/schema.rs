//! Schema model for a job's custom application form.
//!
//! A [`FormSchema`] is an ordered list of [`FieldDefinition`]s. Order is
//! significant: it is both the render order and the storage order. The
//! schema is persisted as a JSON array on the job record, so the serde
//! shape here is the wire and storage format.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// The closed set of field kinds a form can contain.
///
/// Unknown strings deserialize to [`FieldKind::Unsupported`] so that
/// previously stored schemas always load; such fields are skipped when
/// rendering and rejected by [`FormSchema::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Textarea,
    Number,
    Select,
    Checkbox,
    Radio,
    Date,
    File,
    #[serde(other)]
    Unsupported,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Select => "select",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Date => "date",
            FieldKind::File => "file",
            FieldKind::Unsupported => "unsupported",
        }
    }

    /// Select and radio fields are only meaningful with at least one option.
    pub fn requires_options(self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Radio)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque, stable identifier of a field. Older schemas carry
/// timestamp-style ids, new fields get a uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn generate() -> Self {
        FieldId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        FieldId(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        FieldId(value)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One question in an application form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub placeholder: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
}

impl FieldDefinition {
    pub fn new(kind: FieldKind, label: impl Into<String>) -> Self {
        let options = if kind.requires_options() {
            vec![DEFAULT_OPTION.to_string()]
        } else {
            Vec::new()
        };
        Self {
            id: FieldId::generate(),
            kind,
            label: label.into(),
            required: false,
            placeholder: String::new(),
            options,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Seed option given to freshly added select and radio fields.
pub const DEFAULT_OPTION: &str = "Option 1";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ordered sequence of field definitions owned by a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSchema(Vec<FieldDefinition>);

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDefinition> {
        self.0.iter()
    }

    pub fn get(&self, id: &FieldId) -> Option<&FieldDefinition> {
        self.0.iter().find(|f| &f.id == id)
    }

    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.0.iter().position(|f| &f.id == id)
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Vec<FieldDefinition> {
        &mut self.0
    }

    /// Checks every persistence-time rule and reports all violations at once.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut violations = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut seen_labels = HashSet::new();

        for (index, field) in self.0.iter().enumerate() {
            let position = index + 1;
            let label = field.label.trim();

            if field.id.as_str().trim().is_empty() {
                violations.push(SchemaViolation::BlankId { position });
            } else if !seen_ids.insert(field.id.as_str()) {
                violations.push(SchemaViolation::DuplicateId {
                    position,
                    id: field.id.to_string(),
                });
            }

            if field.kind == FieldKind::Unsupported {
                violations.push(SchemaViolation::UnsupportedKind {
                    position,
                    label: label.to_string(),
                });
            }

            if field.kind.requires_options() && field.options.is_empty() {
                violations.push(SchemaViolation::MissingOptions {
                    position,
                    label: label.to_string(),
                    kind: field.kind,
                });
            }

            if label.is_empty() {
                violations.push(SchemaViolation::BlankLabel { position });
            } else if !seen_labels.insert(label) {
                violations.push(SchemaViolation::DuplicateLabel {
                    position,
                    label: label.to_string(),
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { violations })
        }
    }
}

impl From<Vec<FieldDefinition>> for FormSchema {
    fn from(fields: Vec<FieldDefinition>) -> Self {
        FormSchema(fields)
    }
}

impl<'a> IntoIterator for &'a FormSchema {
    type Item = &'a FieldDefinition;
    type IntoIter = std::slice::Iter<'a, FieldDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A single broken rule. Positions are 1-based, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("field {position} ({label:?}) is a {kind} field without options")]
    MissingOptions {
        position: usize,
        label: String,
        kind: FieldKind,
    },
    #[error("field {position} has an empty id")]
    BlankId { position: usize },
    #[error("field {position} repeats id {id}")]
    DuplicateId { position: usize, id: String },
    #[error("field {position} ({label:?}) has an unsupported type")]
    UnsupportedKind { position: usize, label: String },
    #[error("field {position} has an empty label")]
    BlankLabel { position: usize },
    #[error("field {position} repeats label {label:?}")]
    DuplicateLabel { position: usize, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid form schema: {}", join_violations(.violations))]
pub struct SchemaError {
    pub violations: Vec<SchemaViolation>,
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
