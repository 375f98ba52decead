//! Collection builder.
//!
//! Turns an ordered list of route descriptors into a [`Collection`]: one
//! request per route, grouped into folders by the route's leading path
//! segment, folders sorted by name.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};
use tracing::{debug, instrument, trace};

use routeman_shared::{
    AppConfig, BASE_URL_VAR, Collection, Folder, POSTMAN_SCHEMA_URL, RequestItem,
    RouteDescriptor, TOKEN_VAR, Variable,
};

/// Verbs preferred, in order, when a route answers to several.
const METHOD_PRIORITY: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

/// Folder used when a route path has nothing after its prefix.
const ROOT_FOLDER: &str = "Root";

/// Inputs to [`build_collection`] that do not come from the routes themselves.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub title: String,
    pub description: String,
    /// Default value of the `base_url` variable.
    pub base_url: String,
    /// Middleware identifiers that mark a route as authenticated.
    pub auth_middleware: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for BuildOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            title: config.collection.name.clone(),
            description: config.collection.description.clone(),
            base_url: config.collection.base_url.trim_end_matches('/').to_string(),
            auth_middleware: config.auth.middleware.clone(),
        }
    }
}

/// Result of a build: the collection plus how many routes were dropped.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub collection: Collection,
    /// HEAD-only routes that produced no request.
    pub skipped: usize,
}

/// Build a collection from route descriptors.
#[instrument(skip_all, fields(route_count = routes.len()))]
pub fn build_collection(routes: &[RouteDescriptor], options: &BuildOptions) -> BuildOutput {
    let mut folders: BTreeMap<String, Vec<RequestItem>> = BTreeMap::new();
    let mut skipped = 0;

    for route in routes {
        let Some(item) = build_request(route, &options.auth_middleware) else {
            trace!(path = %route.path, "skipping HEAD-only route");
            skipped += 1;
            continue;
        };
        folders
            .entry(folder_name(&route.path))
            .or_default()
            .push(item);
    }

    let folders: Vec<Folder> = folders
        .into_iter()
        .map(|(name, items)| Folder { name, items })
        .collect();

    debug!(folders = folders.len(), skipped, "collection built");

    BuildOutput {
        collection: Collection {
            title: options.title.clone(),
            description: options.description.clone(),
            schema_url: POSTMAN_SCHEMA_URL.to_string(),
            variables: vec![
                Variable::string(BASE_URL_VAR, options.base_url.clone()),
                Variable::string(TOKEN_VAR, ""),
            ],
            folders,
        },
        skipped,
    }
}

/// Derive the request for one route, or `None` for a HEAD-only route.
pub fn build_request(route: &RouteDescriptor, auth_middleware: &[String]) -> Option<RequestItem> {
    if route.is_head_only() {
        return None;
    }

    let method = select_method(&route.methods)?.to_string();

    let display_name = match route.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{method} {}", route.path),
    };

    let auth_required = route
        .middleware
        .iter()
        .any(|m| auth_middleware.iter().any(|known| known == m));

    let body_template = matches!(method.as_str(), "POST" | "PUT")
        .then(|| body_template(&route.path));

    Some(RequestItem {
        display_name,
        url: format!("{{{{{BASE_URL_VAR}}}}}/{}", route.path),
        path: route.path.clone(),
        method,
        headers: vec![("Accept".to_string(), "application/json".to_string())],
        auth_required,
        body_template,
    })
}

/// Pick the verb to use for a route answering to `methods`.
pub fn select_method(methods: &[String]) -> Option<&str> {
    METHOD_PRIORITY
        .iter()
        .find(|preferred| methods.iter().any(|m| m == *preferred))
        .copied()
        .or_else(|| methods.first().map(String::as_str))
}

/// Folder a route path belongs to.
pub fn folder_name(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("api/") {
        let segment = rest.split('/').next().unwrap_or_default();
        if segment.is_empty() {
            return ROOT_FOLDER.to_string();
        }
        return capitalize(segment);
    }

    if path.starts_with("sanctum") {
        "Auth".to_string()
    } else if path.starts_with("google") {
        "Google".to_string()
    } else {
        "Other".to_string()
    }
}

/// Upper-case the first character, lower-case the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Example request body for a POST/PUT route, chosen from its path.
pub fn body_template(path: &str) -> Map<String, Value> {
    let template = if path.contains("login") {
        json!({ "email": "admin@travelops.com", "password": "password" })
    } else if path.contains("register") {
        json!({ "name": "", "email": "", "password": "", "password_confirmation": "" })
    } else if path.contains("password/email") {
        json!({ "email": "" })
    } else if path.contains("password/reset") {
        json!({ "token": "", "email": "", "password": "", "password_confirmation": "" })
    } else {
        json!({})
    };

    match template {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
