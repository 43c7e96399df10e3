#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kvgraph::{
    AttrKind, AttrValue, Attribute, GraphStore, KvBackend, KvGraphError, Record, Traits, Vertex,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub email: String,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Person {
            name: name.to_string(),
            age,
            email: format!("{name}@example.org"),
        }
    }
}

impl Record for Person {
    fn attributes() -> &'static [Attribute] {
        const ATTRS: &[Attribute] = &[
            Attribute::new("name", 'n', AttrKind::Str),
            Attribute::new("age", 'a', AttrKind::Int),
            Attribute::new("email", 'e', AttrKind::Str),
        ];
        ATTRS
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "name" => Some(self.name.clone().into()),
            "age" => Some(self.age.into()),
            "email" => Some(self.email.clone().into()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: AttrValue) -> Result<(), KvGraphError> {
        match name {
            "name" => self.name = value.try_into()?,
            "age" => self.age = value.try_into()?,
            "email" => self.email = value.try_into()?,
            _ => {}
        }
        Ok(())
    }
}

impl Vertex for Person {
    const TYPE: char = 'p';

    fn id(&self) -> String {
        self.name.clone()
    }

    fn from_id(id: &str) -> Self {
        Person {
            name: id.to_string(),
            ..Person::default()
        }
    }
}

/// Vertex with one attribute of every kind and an identity that is not an attribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Task {
    pub key: String,
    pub title: String,
    pub points: u64,
    pub priority: i64,
    pub estimate: f64,
    pub done: bool,
    pub due: Option<DateTime<Utc>>,
}

impl Record for Task {
    fn attributes() -> &'static [Attribute] {
        const ATTRS: &[Attribute] = &[
            Attribute::new("title", 't', AttrKind::Str),
            Attribute::new("points", 'p', AttrKind::Uint),
            Attribute::new("priority", 'r', AttrKind::Int),
            Attribute::new("estimate", 'x', AttrKind::Float),
            Attribute::new("done", 'd', AttrKind::Bool),
            Attribute::new("due", 'u', AttrKind::Time),
        ];
        ATTRS
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "title" => Some(self.title.clone().into()),
            "points" => Some(self.points.into()),
            "priority" => Some(self.priority.into()),
            "estimate" => Some(self.estimate.into()),
            "done" => Some(self.done.into()),
            "due" => self.due.map(AttrValue::from),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: AttrValue) -> Result<(), KvGraphError> {
        match name {
            "title" => self.title = value.try_into()?,
            "points" => self.points = value.try_into()?,
            "priority" => self.priority = value.try_into()?,
            "estimate" => self.estimate = value.try_into()?,
            "done" => self.done = value.try_into()?,
            "due" => self.due = Some(value.try_into()?),
            _ => {}
        }
        Ok(())
    }
}

impl Vertex for Task {
    const TYPE: char = 't';

    fn id(&self) -> String {
        self.key.clone()
    }

    fn from_id(id: &str) -> Self {
        Task {
            key: id.to_string(),
            ..Task::default()
        }
    }
}

pub fn memory_backend() -> Arc<KvBackend> {
    Arc::new(KvBackend::open_in_memory().expect("backend"))
}

pub fn memory_store<T: Vertex>(traits: Traits) -> GraphStore<T> {
    GraphStore::new(memory_backend(), traits).expect("store")
}

/// Store with the given people already added; returns their hashes in order.
pub fn people(store: &GraphStore<Person>, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            store
                .add_vertex(&Person::new(name, 20 + idx as i64))
                .expect("vertex")
        })
        .collect()
}
