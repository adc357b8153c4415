use crate::ast::Value;
use ahash::AHashMap;

/// The names a formula can read: the top-level fields of one data record.
///
/// Aggregate helpers and the safe constructors live in a fixed function table
/// and are resolved by call position, so a data field named `count` does not
/// shadow `count(...)` and vice versa. A context is built per evaluation call
/// and is never shared between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionContext {
    fields: AHashMap<String, Value>,
}

impl ExpressionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from a JSON record. Anything other than an object
    /// yields an empty context.
    pub fn from_json(data: &serde_json::Value) -> Self {
        let fields = match data {
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
            _ => AHashMap::new(),
        };
        Self { fields }
    }

    pub fn from_fields(fields: AHashMap<String, Value>) -> Self {
        Self { fields }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Name resolution chain used while walking the AST.
pub(super) enum Scope<'a> {
    Root(&'a ExpressionContext),
    /// Inside an arrow function or bracket filter: one name bound to the current item.
    Binding {
        name: &'a str,
        value: &'a Value,
        parent: &'a Scope<'a>,
    },
}

impl<'a> Scope<'a> {
    pub(super) fn lookup(&self, name: &str) -> Option<&'a Value> {
        match *self {
            Scope::Root(context) => context.get(name),
            Scope::Binding {
                name: bound,
                value,
                parent,
            } => {
                if bound == name {
                    Some(value)
                } else {
                    parent.lookup(name)
                }
            }
        }
    }
}
