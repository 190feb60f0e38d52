//! Form host capabilities consumed by searchable fields.
//!
//! A searchable field never owns the inputs it reads or writes. Every lookup
//! goes through a [`FormHost`], so hosts whose forms change between
//! interactions are always consulted afresh.

/// Handle to a form input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub name: String,
    pub id: Option<String>,
    /// Enclosing form section; `None` for fields at the top level.
    pub scope: Option<String>,
}

impl FieldRef {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
            scope: None,
        }
    }

    pub fn in_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// Operations a form must provide to host searchable fields.
pub trait FormHost {
    /// Nearest field called `name` as seen from `origin`.
    fn find_near_by(&self, origin: &FieldRef, name: &str) -> Option<FieldRef>;

    /// Field whose element id is `id`.
    fn field_by_id(&self, id: &str) -> Option<FieldRef>;

    /// Every field whose dependency declaration lists `key`.
    fn fields_depending_on(&self, key: &str) -> Vec<FieldRef>;

    /// Current live value, `None` when the field no longer exists.
    fn value(&self, field: &FieldRef) -> Option<String>;

    fn set_value(&mut self, field: &FieldRef, value: &str);

    /// Empty both the live value and the reflected `value` attribute.
    fn clear_value(&mut self, field: &FieldRef);

    /// Notify change listeners bound to `field`.
    fn dispatch_change(&mut self, field: &FieldRef);
}

/// A field of a [`MemoryForm`].
#[derive(Debug, Clone, Default)]
pub struct MemoryField {
    pub name: String,
    pub id: Option<String>,
    pub scope: Option<String>,
    pub value: String,
    /// Reflected `value` attribute, kept apart from the live value.
    pub attribute: String,
    pub depends_on: Vec<String>,
}

impl MemoryField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    /// Initial value, mirrored into the attribute as markup would.
    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.attribute = value.to_string();
        self
    }

    pub fn depends_on(mut self, declaration: &str) -> Self {
        self.depends_on = crate::config::parse_depends_on(declaration);
        self
    }

    fn to_ref(&self) -> FieldRef {
        FieldRef {
            name: self.name.clone(),
            id: self.id.clone(),
            scope: self.scope.clone(),
        }
    }

    fn is(&self, field: &FieldRef) -> bool {
        self.name == field.name && self.scope == field.scope
    }
}

/// In-memory form for hosts without a document model, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    fields: Vec<MemoryField>,
    changes: Vec<FieldRef>,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: MemoryField) -> Self {
        self.add_field(field);
        self
    }

    pub fn add_field(&mut self, field: MemoryField) -> FieldRef {
        let handle = field.to_ref();
        self.fields.push(field);
        handle
    }

    pub fn remove_field(&mut self, field: &FieldRef) {
        self.fields.retain(|f| !f.is(field));
    }

    /// Look up a field by name, preferring the top level.
    pub fn field(&self, name: &str) -> Option<FieldRef> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .min_by_key(|f| f.scope.is_some())
            .map(MemoryField::to_ref)
    }

    pub fn get(&self, field: &FieldRef) -> Option<&MemoryField> {
        self.fields.iter().find(|f| f.is(field))
    }

    pub fn attribute(&self, field: &FieldRef) -> Option<String> {
        self.get(field).map(|f| f.attribute.clone())
    }

    /// Change notifications in dispatch order.
    pub fn changes(&self) -> &[FieldRef] {
        &self.changes
    }

    pub fn change_count(&self, field: &FieldRef) -> usize {
        self.changes.iter().filter(|c| *c == field).count()
    }

    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    fn get_mut(&mut self, field: &FieldRef) -> Option<&mut MemoryField> {
        self.fields.iter_mut().find(|f| f.is(field))
    }
}

impl FormHost for MemoryForm {
    fn find_near_by(&self, origin: &FieldRef, name: &str) -> Option<FieldRef> {
        let mut candidates = self.fields.iter().filter(|f| f.name == name);
        let same_scope = candidates.clone().find(|f| f.scope == origin.scope);
        same_scope
            .or_else(|| candidates.next())
            .map(MemoryField::to_ref)
    }

    fn field_by_id(&self, id: &str) -> Option<FieldRef> {
        self.fields
            .iter()
            .find(|f| f.id.as_deref() == Some(id))
            .map(MemoryField::to_ref)
    }

    fn fields_depending_on(&self, key: &str) -> Vec<FieldRef> {
        self.fields
            .iter()
            .filter(|f| f.depends_on.iter().any(|d| d == key))
            .map(MemoryField::to_ref)
            .collect()
    }

    fn value(&self, field: &FieldRef) -> Option<String> {
        self.get(field).map(|f| f.value.clone())
    }

    fn set_value(&mut self, field: &FieldRef, value: &str) {
        if let Some(f) = self.get_mut(field) {
            f.value = value.to_string();
        }
    }

    fn clear_value(&mut self, field: &FieldRef) {
        if let Some(f) = self.get_mut(field) {
            f.value.clear();
            f.attribute.clear();
        }
    }

    fn dispatch_change(&mut self, field: &FieldRef) {
        self.changes.push(field.clone());
    }
}
