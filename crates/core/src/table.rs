//! Constant and macro tables.
//!
//! Both tables iterate in first-definition order; redefining a name replaces
//! its value in place.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The capability a computed macro provides: called with exactly `arity()`
/// string arguments, returns a string or an error message.
pub trait MacroFn: Send + Sync {
    fn arity(&self) -> usize;

    fn call(&self, args: &[String]) -> Result<String, String>;
}

/// How a macro produces its replacement text.
#[derive(Clone)]
pub enum MacroKind {
    /// Body text with parameter names as placeholders.
    Text(String),
    /// Body evaluated over the bound arguments.
    Computed(Arc<dyn MacroFn>),
}

impl fmt::Debug for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroKind::Text(body) => f.debug_tuple("Text").field(body).finish(),
            MacroKind::Computed(func) => f
                .debug_struct("Computed")
                .field("arity", &func.arity())
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MacroDefinition {
    pub params: Vec<String>,
    pub kind: MacroKind,
}

impl MacroDefinition {
    pub fn text(params: Vec<String>, body: impl Into<String>) -> Self {
        MacroDefinition {
            params,
            kind: MacroKind::Text(body.into()),
        }
    }

    /// Returns `None` when the callable's arity disagrees with `params`.
    pub fn computed(params: Vec<String>, func: Arc<dyn MacroFn>) -> Option<Self> {
        if func.arity() != params.len() {
            return None;
        }
        Some(MacroDefinition {
            params,
            kind: MacroKind::Computed(func),
        })
    }
}

/// Insertion-ordered map with last-wins, in-place overwrite.
#[derive(Debug, Clone)]
struct OrderedTable<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedTable<V> {
    fn default() -> Self {
        OrderedTable {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> OrderedTable<V> {
    fn insert(&mut self, name: String, value: V) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    fn get(&self, name: &str) -> Option<&V> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Constant name -> literal replacement text.
#[derive(Debug, Clone, Default)]
pub struct ConstantTable {
    inner: OrderedTable<String>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

/// Macro name -> definition.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    inner: OrderedTable<MacroDefinition>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, def: MacroDefinition) {
        self.inner.insert(name.into(), def);
    }

    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.inner.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MacroDefinition)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl MacroFn for Upper {
        fn arity(&self) -> usize {
            1
        }

        fn call(&self, args: &[String]) -> Result<String, String> {
            Ok(args[0].to_uppercase())
        }
    }

    #[test]
    fn test_redefinition_keeps_position() {
        let mut t = ConstantTable::new();
        t.insert("A", "1");
        t.insert("B", "2");
        t.insert("A", "3");
        let entries: Vec<_> = t.iter().collect();
        assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_computed_arity_must_match_params() {
        assert!(MacroDefinition::computed(vec!["x".into()], Arc::new(Upper)).is_some());
        assert!(MacroDefinition::computed(vec![], Arc::new(Upper)).is_none());
    }

    #[test]
    fn test_macro_lookup() {
        let mut t = MacroTable::new();
        t.insert("ID", MacroDefinition::text(vec!["x".into()], "x"));
        assert!(t.get("ID").is_some());
        assert!(t.get("NOPE").is_none());
        assert!(!t.is_empty());
    }
}
