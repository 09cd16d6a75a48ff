//! CRUD endpoint descriptors of a model, and the segment extraction a router
//! performs for the list endpoint before handing segments to the decoder.

use std::fmt;

use crate::construct::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Patch,
    Delete,
}
impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Put => write!(f, "PUT"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Retrieve,
    Update,
    Delete,
    List,
}
impl Action {
    pub const ALL: [Action; 5] = [Action::Create, Action::Retrieve, Action::Update, Action::Delete, Action::List];
    pub fn name(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
        }
    }
    pub fn method(&self) -> Method {
        match self {
            Action::Create => Method::Put,
            Action::Retrieve => Method::Get,
            Action::Update => Method::Patch,
            Action::Delete => Method::Delete,
            Action::List => Method::Get,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    model: String,
    action: Action,
    path: String,
}
impl Endpoint {
    pub fn new(action: Action, model: &Model) -> Self {
        let path = match action {
            Action::Create => format!("/{}", model.name()),
            Action::Retrieve | Action::Update | Action::Delete => format!("/{}/:{}", model.name(), model.id().name()),
            Action::List => format!("/{}{}", model.collection(), model.grammar().path_template()),
        };
        Self {
            model: model.name().to_owned(),
            action,
            path,
        }
    }
    pub fn for_model(model: &Model) -> Vec<Endpoint> {
        Action::ALL.iter().map(|&action| Endpoint::new(action, model)).collect()
    }
    pub fn model(&self) -> &str {
        &self.model
    }
    pub fn action(&self) -> Action {
        self.action
    }
    pub fn method(&self) -> Method {
        self.action.method()
    }
    pub fn path(&self) -> &str {
        &self.path
    }
}
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:<6} {} ({} {})", self.method().to_string(), self.path, self.model, self.action.name())
    }
}

/// Positional segments of a request to the list endpoint of `model`, in
/// order. Omitted trailing segments are simply absent. Returns `None` when
/// the path is not a list path of the model: another prefix, an empty
/// segment in between, or more segments than the grammar has positions.
/// Segments are returned as they appear in the path, without percent-decoding.
pub fn list_segments(model: &Model, request_path: &str) -> Option<Vec<String>> {
    let path = request_path.split('?').next().unwrap_or_default();
    let rest = path.strip_prefix('/')?.strip_prefix(model.collection())?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    if rest.is_empty() {
        return Some(Vec::new());
    }
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let segments: Vec<String> = rest.split('/').map(str::to_owned).collect();
    if segments.iter().any(String::is_empty) || segments.len() > model.grammar().path_length() {
        return None;
    }
    Some(segments)
}
