//! Macro set — named textual substitutions (`&name`)
//!
//! Macros splice identifiers or value lists into raw SQL before parameter
//! processing. Substitution is literal; nothing is escaped.

use crate::variant::Variant;

#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    pub value: Variant,
}

impl Macro {
    pub fn token(&self) -> String {
        format!("&{}", self.name)
    }
}

/// Macros in registration order.
#[derive(Debug, Clone, Default)]
pub struct Macros {
    list: Vec<Macro>,
}

impl Macros {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a macro, replacing the value of an existing one with the same name.
    pub fn set_macro(&mut self, name: &str, value: impl Into<Variant>) {
        let value = value.into();
        match self.macro_by_name_mut(name) {
            Some(existing) => existing.value = value,
            None => self.list.push(Macro {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn macro_by_name(&self, name: &str) -> Option<&Macro> {
        self.list.iter().find(|m| m.name == name)
    }

    fn macro_by_name_mut(&mut self, name: &str) -> Option<&mut Macro> {
        self.list.iter_mut().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Replaces every `&name` occurrence, macro by macro in registration order.
    pub fn apply(&self, sql: &str) -> String {
        let mut out = sql.to_string();
        for m in &self.list {
            out = out.replace(&m.token(), &m.value.macro_text());
        }
        out
    }
}
