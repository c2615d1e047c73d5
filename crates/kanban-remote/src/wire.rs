//! Entities as the WordPress REST API (`wp/v2`) sends and receives them.

use chrono::NaiveDateTime;
use kanban_domain::{PostStatus, TaskMeta};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A `{ "rendered": "..." }` text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

impl From<&str> for Rendered {
    fn from(s: &str) -> Self {
        Self {
            rendered: s.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCategory {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    /// The remote `name` field is display text, not a key.
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "count", default)]
    pub post_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: i64,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(rename = "categories", default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub modified: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "deserialize_meta")]
    pub meta: TaskMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteComment {
    pub id: i64,
    #[serde(rename = "post")]
    pub parent_post_id: i64,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCreate {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub categories: Vec<i64>,
    pub status: PostStatus,
    pub meta: TaskMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<TaskMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentCreate {
    pub post: i64,
    pub content: String,
    pub author_name: String,
    pub author_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Summary of the `/wp-json` index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiInfo {
    pub namespaces: Vec<String>,
    pub routes: Vec<String>,
    pub authentication: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiIndex {
    #[serde(default)]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub routes: Map<String, Value>,
    #[serde(default)]
    pub authentication: Value,
}

impl From<ApiIndex> for ApiInfo {
    fn from(index: ApiIndex) -> Self {
        Self {
            namespaces: index.namespaces,
            routes: index.routes.into_iter().map(|(route, _)| route).collect(),
            authentication: index.authentication,
        }
    }
}

/// Post meta arrives as an object, or as `[]` when no meta is registered.
/// Strings are kept verbatim, other scalars become their JSON text.
pub fn meta_from_value(value: Value) -> TaskMeta {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, v)| match v {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect(),
        _ => TaskMeta::new(),
    }
}

fn deserialize_meta<'de, D>(deserializer: D) -> Result<TaskMeta, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(meta_from_value)
}
