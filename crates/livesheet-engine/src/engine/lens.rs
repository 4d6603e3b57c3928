//! Scope lens: a narrowed, deduplicated view of a shared name → value scope.
//!
//! A cell never reads the whole scope. It reads a [`Bindings`] snapshot of
//! exactly its formula's free variables, and only re-evaluates when that
//! snapshot differs from the previous one.

use super::eval::Value;

/// Read access to a name → value mapping.
pub trait ScopeSource {
    /// Current value of `name`. Absent names read as undefined.
    fn lookup(&self, name: &str) -> Value;
}

impl ScopeSource for std::collections::HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Value {
        self.get(name).copied().flatten()
    }
}

/// A consistent snapshot of the values of a fixed, ordered set of names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings(Vec<(String, Value)>);

impl Bindings {
    /// Value bound to `name`; undefined when the name is not part of the snapshot.
    pub fn get(&self, name: &str) -> Value {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read `vars` from `scope` into one snapshot, substituting undefined for absent names.
pub fn narrow(scope: &impl ScopeSource, vars: &[String]) -> Bindings {
    Bindings(
        vars.iter()
            .map(|name| (name.clone(), scope.lookup(name)))
            .collect(),
    )
}

/// A live narrowed view: remembers the last snapshot it emitted.
#[derive(Clone, Debug)]
pub struct ScopeLens {
    vars: Vec<String>,
    last: Option<Bindings>,
}

impl ScopeLens {
    pub fn new(vars: &[String]) -> Self {
        ScopeLens {
            vars: vars.to_vec(),
            last: None,
        }
    }

    /// Names this lens tracks.
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    /// Re-read the scope. Returns the new snapshot only when it differs from
    /// the last one emitted; the first poll always emits.
    pub fn poll(&mut self, scope: &impl ScopeSource) -> Option<&Bindings> {
        let next = narrow(scope, &self.vars);
        if self.last.as_ref() == Some(&next) {
            return None;
        }
        self.last = Some(next);
        self.last.as_ref()
    }
}
