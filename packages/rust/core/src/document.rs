//! Postman v2.1 wire format.
//!
//! [`PostmanCollection::from_collection`] maps the domain [`Collection`] onto the JSON
//! shape Postman imports; [`render_pretty`] produces the four-space indented
//! text used for both the file and request bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use routeman_shared::{
    Collection, Folder, RequestItem, Result, RoutemanError, TOKEN_VAR, Variable,
};

/// Host segment every request URL starts with.
const BASE_URL_HOST: &str = "{{base_url}}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: Info,
    pub item: Vec<PostmanFolder>,
    pub variable: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub name: String,
    pub description: String,
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanFolder {
    pub name: String,
    pub item: Vec<PostmanItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanItem {
    pub name: String,
    pub request: PostmanRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanRequest {
    pub method: String,
    pub header: Vec<Header>,
    pub url: PostmanUrl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanUrl {
    pub raw: String,
    pub host: Vec<String>,
    pub path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(rename = "type")]
    pub kind: String,
    pub bearer: Vec<Variable>,
}

impl Auth {
    /// Bearer auth reading the `{{token}}` collection variable.
    pub fn bearer_token() -> Self {
        Self {
            kind: "bearer".into(),
            bearer: vec![Variable::string(TOKEN_VAR, format!("{{{{{TOKEN_VAR}}}}}"))],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,
    pub raw: String,
    pub options: BodyOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyOptions {
    pub raw: RawOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOptions {
    pub language: String,
}

impl Body {
    /// Raw JSON body holding `template`.
    pub fn json(template: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            mode: "raw".into(),
            raw: render_pretty(template)?,
            options: BodyOptions {
                raw: RawOptions {
                    language: "json".into(),
                },
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl PostmanCollection {
    pub fn from_collection(collection: &Collection) -> Result<Self> {
        Ok(Self {
            info: Info {
                name: collection.title.clone(),
                description: collection.description.clone(),
                schema: collection.schema_url.clone(),
            },
            item: collection
                .folders
                .iter()
                .map(PostmanFolder::from_folder)
                .collect::<Result<_>>()?,
            variable: collection.variables.clone(),
        })
    }
}

impl PostmanFolder {
    fn from_folder(folder: &Folder) -> Result<Self> {
        Ok(Self {
            name: folder.name.clone(),
            item: folder
                .items
                .iter()
                .map(PostmanItem::from_request)
                .collect::<Result<_>>()?,
        })
    }
}

impl PostmanItem {
    fn from_request(item: &RequestItem) -> Result<Self> {
        let body = item.body_template.as_ref().map(Body::json).transpose()?;

        Ok(Self {
            name: item.display_name.clone(),
            request: PostmanRequest {
                method: item.method.clone(),
                header: item
                    .headers
                    .iter()
                    .map(|(key, value)| Header {
                        key: key.clone(),
                        value: value.clone(),
                        kind: "text".into(),
                    })
                    .collect(),
                url: PostmanUrl {
                    raw: item.url.clone(),
                    host: vec![BASE_URL_HOST.to_string()],
                    path: item.path.split('/').map(String::from).collect(),
                },
                auth: item.auth_required.then(Auth::bearer_token),
                body,
            },
        })
    }
}

/// Serialize with four-space indentation.
pub fn render_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| RoutemanError::output(format!("failed to serialize collection: {e}")))?;
    String::from_utf8(buf)
        .map_err(|e| RoutemanError::output(format!("serialized collection is not UTF-8: {e}")))
}
