//! Core domain types: route descriptors in, Postman collection out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, RoutemanError};

/// Schema identifier written into `info.schema`.
pub const POSTMAN_SCHEMA_URL: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Collection variable holding the server root.
pub const BASE_URL_VAR: &str = "base_url";

/// Collection variable holding the bearer token.
pub const TOKEN_VAR: &str = "token";

// ---------------------------------------------------------------------------
// Route listing input
// ---------------------------------------------------------------------------

/// One entry of `php artisan route:list --json`, as it appears on the wire.
/// Other fields (`domain`, `action`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoute {
    pub uri: String,
    /// Pipe-separated verb list, e.g. `GET|HEAD`.
    pub method: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub middleware: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Validated metadata for one HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Route path without a leading slash, e.g. `api/users/{user}`.
    pub path: String,
    /// Verbs in listing order, duplicates removed. Never empty.
    pub methods: Vec<String>,
    pub name: Option<String>,
    pub middleware: Vec<String>,
}

impl RouteDescriptor {
    /// Build a descriptor from a path and a pipe-separated verb list.
    pub fn new(path: impl Into<String>, methods: &str) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(RoutemanError::malformed("route has an empty uri", methods));
        }

        let mut verbs: Vec<String> = Vec::new();
        for verb in methods.split('|').map(str::trim).filter(|v| !v.is_empty()) {
            let verb = verb.to_ascii_uppercase();
            if !verbs.contains(&verb) {
                verbs.push(verb);
            }
        }
        if verbs.is_empty() {
            return Err(RoutemanError::malformed(
                format!("route '{path}' has no HTTP method"),
                methods,
            ));
        }

        Ok(Self {
            path,
            methods: verbs,
            name: None,
            middleware: Vec::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_middleware<I, S>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware = middleware.into_iter().map(Into::into).collect();
        self
    }

    /// True when `HEAD` is the only verb the route answers to.
    pub fn is_head_only(&self) -> bool {
        self.methods.len() == 1 && self.methods[0] == "HEAD"
    }
}

impl TryFrom<RawRoute> for RouteDescriptor {
    type Error = RoutemanError;

    fn try_from(raw: RawRoute) -> Result<Self> {
        let mut descriptor = Self::new(raw.uri, &raw.method)?;
        descriptor.name = raw.name;
        descriptor.middleware = raw.middleware;
        Ok(descriptor)
    }
}

// ---------------------------------------------------------------------------
// Derived request items
// ---------------------------------------------------------------------------

/// A single runnable request derived from one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestItem {
    pub display_name: String,
    pub method: String,
    /// Route path the URL was built from.
    pub path: String,
    /// `{{base_url}}/<path>`.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub auth_required: bool,
    pub body_template: Option<Map<String, Value>>,
}

/// A named group of request items.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: String,
    pub items: Vec<RequestItem>,
}

/// A `{key, value, type}` collection variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Variable {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind: "string".into(),
        }
    }
}

/// The finished collection, folders sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub title: String,
    pub description: String,
    pub schema_url: String,
    pub variables: Vec<Variable>,
    pub folders: Vec<Folder>,
}

impl Collection {
    /// Total number of request items across all folders.
    pub fn request_count(&self) -> usize {
        self.folders.iter().map(|f| f.items.len()).sum()
    }

    pub fn folder(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }
}
