//! Headless form builder.
//!
//! Holds the schema being edited, the id of the field currently in edit
//! mode, and an optional listener that receives the full schema after
//! every mutation. Edits are committed immediately, so switching the
//! edited field never has pending changes to discard.

use tracing::debug;

use crate::schema::{FieldDefinition, FieldId, FieldKind, FormSchema, SchemaError};

/// One entry of the field palette an operator picks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub kind: FieldKind,
    pub label: &'static str,
}

pub const PALETTE: [PaletteEntry; 10] = [
    PaletteEntry { kind: FieldKind::Text, label: "Text Input" },
    PaletteEntry { kind: FieldKind::Email, label: "Email" },
    PaletteEntry { kind: FieldKind::Phone, label: "Phone" },
    PaletteEntry { kind: FieldKind::Textarea, label: "Long Text" },
    PaletteEntry { kind: FieldKind::Number, label: "Number" },
    PaletteEntry { kind: FieldKind::Select, label: "Dropdown" },
    PaletteEntry { kind: FieldKind::Checkbox, label: "Checkbox" },
    PaletteEntry { kind: FieldKind::Radio, label: "Radio Buttons" },
    PaletteEntry { kind: FieldKind::Date, label: "Date" },
    PaletteEntry { kind: FieldKind::File, label: "File Upload" },
];

/// Looks up the palette entry for a kind.
pub fn palette_entry(kind: FieldKind) -> Option<&'static PaletteEntry> {
    PALETTE.iter().find(|entry| entry.kind == kind)
}

/// Partial update merged into a field by [`FormBuilder::update_field`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: Some(placeholder.into()),
            ..Self::default()
        }
    }

    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Self::default()
        }
    }

    /// Options typed one per line; blank lines are dropped.
    pub fn options_text(text: &str) -> Self {
        Self {
            options: Some(text.lines().map(str::to_string).collect()),
            ..Self::default()
        }
    }
}

type ChangeListener = Box<dyn FnMut(&FormSchema) + Send>;

#[derive(Default)]
pub struct FormBuilder {
    schema: FormSchema,
    editing: Option<FieldId>,
    on_change: Option<ChangeListener>,
}

impl std::fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormBuilder")
            .field("schema", &self.schema)
            .field("editing", &self.editing)
            .finish_non_exhaustive()
    }
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a previously persisted schema (editing an existing job).
    pub fn from_schema(schema: FormSchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    pub fn on_change(mut self, listener: impl FnMut(&FormSchema) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(listener));
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn editing(&self) -> Option<&FieldId> {
        self.editing.as_ref()
    }

    pub fn add_field(&mut self, entry: &PaletteEntry) -> FieldId {
        let field = FieldDefinition::new(entry.kind, entry.label);
        let id = field.id.clone();
        self.schema.fields_mut().push(field);
        debug!(field_id = %id, kind = %entry.kind, "added form field");
        self.notify();
        id
    }

    /// Merges `patch` into the field with `id`. Returns `false` when no such
    /// field exists; the schema is left untouched in that case.
    pub fn update_field(&mut self, id: &FieldId, patch: FieldPatch) -> bool {
        let Some(field) = self.schema.fields_mut().iter_mut().find(|f| &f.id == id) else {
            return false;
        };

        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(placeholder) = patch.placeholder {
            field.placeholder = placeholder;
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        if let Some(options) = patch.options {
            field.options = options
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        self.notify();
        true
    }

    /// Removes the field with `id`, if present.
    pub fn remove_field(&mut self, id: &FieldId) -> bool {
        let Some(index) = self.schema.position(id) else {
            return false;
        };
        self.schema.fields_mut().remove(index);
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        self.notify();
        true
    }

    /// Moves the field at `from` to `to`, shifting the fields in between.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds. Callers check bounds first.
    pub fn move_field(&mut self, from: usize, to: usize) {
        let len = self.schema.len();
        assert!(
            from < len && to < len,
            "move_field({from}, {to}) out of bounds for {len} fields"
        );
        let fields = self.schema.fields_mut();
        let field = fields.remove(from);
        fields.insert(to, field);
        self.notify();
    }

    /// Puts `id` into edit mode; any other field leaves it.
    pub fn begin_edit(&mut self, id: &FieldId) -> bool {
        if self.schema.get(id).is_none() {
            return false;
        }
        self.editing = Some(id.clone());
        true
    }

    pub fn end_edit(&mut self) {
        self.editing = None;
    }

    pub fn is_editing(&self, id: &FieldId) -> bool {
        self.editing.as_ref() == Some(id)
    }

    /// Returns the schema ready to be saved on a job, or every rule it breaks.
    pub fn publish(&self) -> Result<FormSchema, SchemaError> {
        self.schema.validate()?;
        Ok(self.schema.clone())
    }

    fn notify(&mut self) {
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.schema);
        }
    }
}

/// Tracks a field being dragged. Each hover over another position moves
/// the field there at once, so the displayed order is always the schema
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    index: usize,
}

impl DragSession {
    pub fn start(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Hovers outside the schema, or after the dragged field is gone,
    /// leave the order alone.
    pub fn hover(&mut self, builder: &mut FormBuilder, over: usize) {
        let len = builder.schema().len();
        if self.index >= len || over >= len {
            return;
        }
        if self.index != over {
            builder.move_field(self.index, over);
            self.index = over;
        }
    }
}
