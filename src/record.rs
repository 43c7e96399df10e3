//! The record capability the codec works against.
//!
//! A record type lists its attributes once, at the type level, and exposes
//! name-based accessors for them:
//!
//! ```rust
//! use kvgraph::{AttrKind, AttrValue, Attribute, KvGraphError, Record, Vertex};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct User {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Record for User {
//!     fn attributes() -> &'static [Attribute] {
//!         const ATTRS: &[Attribute] = &[
//!             Attribute::new("name", 'n', AttrKind::Str),
//!             Attribute::new("age", 'a', AttrKind::Int),
//!         ];
//!         ATTRS
//!     }
//!
//!     fn attribute(&self, name: &str) -> Option<AttrValue> {
//!         match name {
//!             "name" => Some(self.name.clone().into()),
//!             "age" => Some(self.age.into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set_attribute(&mut self, name: &str, value: AttrValue) -> Result<(), KvGraphError> {
//!         match name {
//!             "name" => self.name = value.try_into()?,
//!             "age" => self.age = value.try_into()?,
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Vertex for User {
//!     const TYPE: char = 'u';
//!
//!     fn id(&self) -> String {
//!         self.name.clone()
//!     }
//!
//!     fn from_id(id: &str) -> Self {
//!         User { name: id.to_string(), ..User::default() }
//!     }
//! }
//! ```

use crate::{errors::KvGraphError, value::AttrKind, value::AttrValue};

/// One entry of a record schema: full attribute name, storage code, declared kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: &'static str,
    pub code: char,
    pub kind: AttrKind,
}

impl Attribute {
    pub const fn new(name: &'static str, code: char, kind: AttrKind) -> Self {
        Self { name, code, kind }
    }
}

pub trait Record: Send + Sync + 'static {
    /// Attribute schema of the type. Must return the same table on every call.
    fn attributes() -> &'static [Attribute]
    where
        Self: Sized;

    /// Current value of `name`, or `None` when the record cannot provide it.
    fn attribute(&self, name: &str) -> Option<AttrValue>;

    /// Assigns `value`, already converted to the declared kind of `name`.
    fn set_attribute(&mut self, name: &str, value: AttrValue) -> Result<(), KvGraphError>;
}

pub trait Vertex: Record + Sized {
    /// Type tag shared by every vertex of this kind.
    const TYPE: char;

    /// Identity within the type. Must not contain the graph's edge separator.
    fn id(&self) -> String;

    /// Decode destination for a stored vertex with the given identity.
    fn from_id(id: &str) -> Self;
}
