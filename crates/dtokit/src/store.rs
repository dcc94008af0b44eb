//! Raw attribute storage.
//!
//! [`AttributeStore`] owns the raw name→value mapping of a container. It knows
//! nothing about casting: values go in and come out exactly as given.
//! Insertion order is kept for enumeration; removing a key keeps the order of
//! the rest. A key holding [`AttrValue::Null`] is present, not absent.

use crate::value::{AttrValue, Attributes};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    attributes: Attributes,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(attributes: Attributes) -> Self {
        Self { attributes }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Insert or overwrite. Overwriting keeps the key's original position.
    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) {
        self.attributes.insert(name.into(), value);
    }

    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn unset(&mut self, name: &str) -> Option<AttrValue> {
        self.attributes.shift_remove(name)
    }

    /// Replace the whole mapping.
    pub fn replace_all(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Attributes {
        &self.attributes
    }

    pub fn to_map(&self) -> Attributes {
        self.attributes.clone()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
