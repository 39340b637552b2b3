//! Names claimed by the templates of one run.

use indexmap::IndexSet;

/// Registry of identifiers already handed out during a run.
///
/// Names are never released. A name claimed a second time gets the suffix
/// `_<n>`, where `n` is the number of names registered so far. Sanitized
/// template identifiers never contain `_`, so a suffixed name cannot clash
/// with a plain one.
#[derive(Debug, Default, Clone)]
pub struct Namespace {
    names: IndexSet<String>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base`, returning the name to use for it.
    pub fn claim(&mut self, base: &str) -> String {
        if self.names.insert(base.to_string()) {
            return base.to_string();
        }

        let mut n = self.names.len();
        let mut name = format!("{base}_{n}");
        while self.names.contains(&name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        self.names.insert(name.clone());
        name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Claimed names in claim order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
