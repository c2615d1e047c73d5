//! In-process stand-in for a WordPress site, for tests.
//!
//! Serves the subset of `wp/v2` the adapter uses, with the same response
//! shapes and error payloads as the real service. Individual requests can be
//! made to fail or stall, and every request is recorded for assertions.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use kanban_domain::slugify;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const FIXED_DATE: &str = "2024-05-01T10:00:00";
const DEFAULT_PER_PAGE: usize = 10;
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }
}

#[derive(Debug, Clone)]
enum RuleAction {
    Fail(u16),
    Delay(Duration),
}

#[derive(Debug, Clone)]
struct Rule {
    method: Option<String>,
    fragment: String,
    action: RuleAction,
}

impl Rule {
    fn matches(&self, method: &str, target: &str) -> bool {
        self.method.as_deref().is_none_or(|m| m == method) && target.contains(&self.fragment)
    }
}

#[derive(Debug, Clone)]
struct FakeCategory {
    id: i64,
    name: String,
    slug: String,
    description: String,
}

#[derive(Debug, Clone)]
struct FakePost {
    id: i64,
    title: String,
    content: String,
    excerpt: String,
    categories: Vec<i64>,
    status: String,
    slug: String,
    meta: Map<String, Value>,
}

#[derive(Debug, Clone)]
struct FakeComment {
    id: i64,
    post: i64,
    author_name: String,
    content: String,
}

#[derive(Debug, Default)]
struct FakeState {
    next_id: i64,
    categories: Vec<FakeCategory>,
    posts: Vec<FakePost>,
    comments: Vec<FakeComment>,
    requests: Vec<RecordedRequest>,
    rules: Vec<Rule>,
    required_auth: Option<String>,
}

type Shared = Arc<Mutex<FakeState>>;
type Reply = (StatusCode, Value);

fn wp_error(status: StatusCode, code: &str, message: &str) -> Reply {
    (
        status,
        json!({"code": code, "message": message, "data": {"status": status.as_u16()}}),
    )
}

fn autop(text: &str) -> String {
    if text.is_empty() || text.trim_start().starts_with('<') {
        text.to_string()
    } else {
        format!("<p>{}</p>\n", text)
    }
}

fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    raw.unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn per_page(query: &HashMap<String, String>) -> usize {
    query
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PER_PAGE)
        .min(MAX_PER_PAGE)
}

fn str_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

fn ids_field(body: &Value, key: &str) -> Option<Vec<i64>> {
    body.get(key)
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
}

impl FakeState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn category_json(&self, c: &FakeCategory) -> Value {
        let count = self
            .posts
            .iter()
            .filter(|p| p.categories.contains(&c.id))
            .count();
        json!({
            "id": c.id,
            "count": count,
            "description": c.description,
            "link": format!("http://fake.test/category/{}/", c.slug),
            "name": c.name,
            "slug": c.slug,
            "taxonomy": "category",
            "parent": 0,
            "meta": [],
        })
    }

    fn post_json(p: &FakePost) -> Value {
        let meta = if p.meta.is_empty() {
            json!([])
        } else {
            Value::Object(p.meta.clone())
        };
        json!({
            "id": p.id,
            "date": FIXED_DATE,
            "modified": FIXED_DATE,
            "slug": p.slug,
            "status": p.status,
            "type": "post",
            "title": {"rendered": p.title},
            "content": {"rendered": autop(&p.content), "protected": false},
            "excerpt": {"rendered": autop(&p.excerpt), "protected": false},
            "categories": p.categories,
            "meta": meta,
        })
    }

    fn comment_json(c: &FakeComment) -> Value {
        json!({
            "id": c.id,
            "post": c.post,
            "author_name": c.author_name,
            "date": FIXED_DATE,
            "content": {"rendered": autop(&c.content)},
            "status": "approved",
        })
    }

    fn insert_category(&mut self, name: &str, slug: Option<String>, description: String) -> Result<i64, Reply> {
        let slug = slug.unwrap_or_else(|| slugify(name));
        if self.categories.iter().any(|c| c.slug == slug) {
            return Err(wp_error(
                StatusCode::BAD_REQUEST,
                "term_exists",
                "A term with the name provided already exists with this parent.",
            ));
        }
        let id = self.allocate_id();
        self.categories.push(FakeCategory {
            id,
            name: name.to_string(),
            slug,
            description,
        });
        Ok(id)
    }

    fn dispatch(
        &mut self,
        method: &str,
        segments: &[&str],
        query: &HashMap<String, String>,
        body: &Value,
    ) -> Reply {
        match segments {
            ["categories"] => self.categories_collection(method, query, body),
            ["categories", id] => match id.parse() {
                Ok(id) => self.category_item(method, id, query, body),
                Err(_) => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
            },
            ["posts"] => self.posts_collection(method, query, body),
            ["posts", id] => match id.parse() {
                Ok(id) => self.post_item(method, id, query, body),
                Err(_) => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
            },
            ["comments"] => self.comments_collection(method, query, body),
            ["comments", id] => match id.parse() {
                Ok(id) => self.comment_item(method, id, query, body),
                Err(_) => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
            },
            _ => wp_error(
                StatusCode::NOT_FOUND,
                "rest_no_route",
                "No route was found matching the URL and request method.",
            ),
        }
    }

    fn categories_collection(&mut self, method: &str, query: &HashMap<String, String>, body: &Value) -> Reply {
        match method {
            "GET" => {
                let items: Vec<Value> = self
                    .categories
                    .iter()
                    .take(per_page(query))
                    .map(|c| self.category_json(c))
                    .collect();
                (StatusCode::OK, Value::Array(items))
            }
            "POST" => {
                let Some(name) = str_field(body, "name").filter(|n| !n.is_empty()) else {
                    return wp_error(
                        StatusCode::BAD_REQUEST,
                        "rest_missing_callback_param",
                        "Missing parameter(s): name",
                    );
                };
                let description = str_field(body, "description").unwrap_or_default();
                match self.insert_category(&name, str_field(body, "slug"), description) {
                    Ok(id) => {
                        let created = self.categories.iter().find(|c| c.id == id).cloned();
                        match created {
                            Some(c) => (StatusCode::CREATED, self.category_json(&c)),
                            None => wp_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "lost"),
                        }
                    }
                    Err(reply) => reply,
                }
            }
            _ => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
        }
    }

    fn category_item(&mut self, method: &str, id: i64, query: &HashMap<String, String>, body: &Value) -> Reply {
        let Some(index) = self.categories.iter().position(|c| c.id == id) else {
            return wp_error(StatusCode::NOT_FOUND, "rest_term_invalid", "Term does not exist.");
        };
        match method {
            "GET" => (StatusCode::OK, self.category_json(&self.categories[index])),
            "PUT" | "POST" | "PATCH" => {
                if let Some(slug) = str_field(body, "slug") {
                    if self.categories.iter().any(|c| c.slug == slug && c.id != id) {
                        return wp_error(
                            StatusCode::BAD_REQUEST,
                            "duplicate_term_slug",
                            "The slug is already in use by another term.",
                        );
                    }
                    self.categories[index].slug = slug;
                }
                if let Some(name) = str_field(body, "name") {
                    self.categories[index].name = name;
                }
                if let Some(description) = str_field(body, "description") {
                    self.categories[index].description = description;
                }
                (StatusCode::OK, self.category_json(&self.categories[index]))
            }
            "DELETE" => {
                if query.get("force").map(String::as_str) != Some("true") {
                    return wp_error(
                        StatusCode::NOT_IMPLEMENTED,
                        "rest_trash_not_supported",
                        "Terms do not support trashing. Set 'force=true' to delete.",
                    );
                }
                let previous = self.category_json(&self.categories[index]);
                self.categories.remove(index);
                for post in &mut self.posts {
                    post.categories.retain(|c| *c != id);
                }
                (StatusCode::OK, json!({"deleted": true, "previous": previous}))
            }
            _ => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
        }
    }

    fn posts_collection(&mut self, method: &str, query: &HashMap<String, String>, body: &Value) -> Reply {
        match method {
            "GET" => {
                let category = query.get("categories").and_then(|v| v.parse::<i64>().ok());
                let items: Vec<Value> = self
                    .posts
                    .iter()
                    .filter(|p| p.status != "trash")
                    .filter(|p| category.is_none_or(|c| p.categories.contains(&c)))
                    .take(per_page(query))
                    .map(Self::post_json)
                    .collect();
                (StatusCode::OK, Value::Array(items))
            }
            "POST" => {
                let categories = ids_field(body, "categories").unwrap_or_default();
                if let Some(missing) = categories
                    .iter()
                    .find(|id| !self.categories.iter().any(|c| c.id == **id))
                {
                    return wp_error(
                        StatusCode::BAD_REQUEST,
                        "rest_invalid_param",
                        &format!("Invalid parameter(s): categories ({})", missing),
                    );
                }
                let title = str_field(body, "title").unwrap_or_default();
                let id = self.allocate_id();
                let post = FakePost {
                    id,
                    slug: slugify(&title),
                    title,
                    content: str_field(body, "content").unwrap_or_default(),
                    excerpt: str_field(body, "excerpt").unwrap_or_default(),
                    categories,
                    status: str_field(body, "status").unwrap_or_else(|| "draft".to_string()),
                    meta: body
                        .get("meta")
                        .and_then(Value::as_object)
                        .cloned()
                        .unwrap_or_default(),
                };
                let reply = Self::post_json(&post);
                self.posts.push(post);
                (StatusCode::CREATED, reply)
            }
            _ => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
        }
    }

    fn post_item(&mut self, method: &str, id: i64, query: &HashMap<String, String>, body: &Value) -> Reply {
        let Some(index) = self.posts.iter().position(|p| p.id == id) else {
            return wp_error(StatusCode::NOT_FOUND, "rest_post_invalid_id", "Invalid post ID.");
        };
        match method {
            "GET" => (StatusCode::OK, Self::post_json(&self.posts[index])),
            "PUT" | "POST" | "PATCH" => {
                if let Some(categories) = ids_field(body, "categories") {
                    self.posts[index].categories = categories;
                }
                let post = &mut self.posts[index];
                if let Some(title) = str_field(body, "title") {
                    post.title = title;
                }
                if let Some(content) = str_field(body, "content") {
                    post.content = content;
                }
                if let Some(excerpt) = str_field(body, "excerpt") {
                    post.excerpt = excerpt;
                }
                if let Some(status) = str_field(body, "status") {
                    post.status = status;
                }
                if let Some(meta) = body.get("meta").and_then(Value::as_object) {
                    for (key, value) in meta {
                        post.meta.insert(key.clone(), value.clone());
                    }
                }
                (StatusCode::OK, Self::post_json(post))
            }
            "DELETE" => {
                if query.get("force").map(String::as_str) == Some("true") {
                    let removed = self.posts.remove(index);
                    self.comments.retain(|c| c.post != id);
                    (
                        StatusCode::OK,
                        json!({"deleted": true, "previous": Self::post_json(&removed)}),
                    )
                } else {
                    self.posts[index].status = "trash".to_string();
                    (StatusCode::OK, Self::post_json(&self.posts[index]))
                }
            }
            _ => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
        }
    }

    fn comments_collection(&mut self, method: &str, query: &HashMap<String, String>, body: &Value) -> Reply {
        match method {
            "GET" => {
                let post = query.get("post").and_then(|v| v.parse::<i64>().ok());
                let items: Vec<Value> = self
                    .comments
                    .iter()
                    .filter(|c| post.is_none_or(|p| c.post == p))
                    .take(per_page(query))
                    .map(Self::comment_json)
                    .collect();
                (StatusCode::OK, Value::Array(items))
            }
            "POST" => {
                let post = body.get("post").and_then(Value::as_i64).unwrap_or_default();
                if !self.posts.iter().any(|p| p.id == post) {
                    return wp_error(
                        StatusCode::FORBIDDEN,
                        "rest_comment_invalid_post_id",
                        "Sorry, you are not allowed to create this comment without a post.",
                    );
                }
                let content = str_field(body, "content").unwrap_or_default();
                if content.is_empty() {
                    return wp_error(
                        StatusCode::BAD_REQUEST,
                        "rest_comment_content_invalid",
                        "Invalid comment content.",
                    );
                }
                let id = self.allocate_id();
                let comment = FakeComment {
                    id,
                    post,
                    author_name: str_field(body, "author_name").unwrap_or_default(),
                    content,
                };
                let reply = Self::comment_json(&comment);
                self.comments.push(comment);
                (StatusCode::CREATED, reply)
            }
            _ => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
        }
    }

    fn comment_item(&mut self, method: &str, id: i64, query: &HashMap<String, String>, body: &Value) -> Reply {
        let Some(index) = self.comments.iter().position(|c| c.id == id) else {
            return wp_error(StatusCode::NOT_FOUND, "rest_comment_invalid_id", "Invalid comment ID.");
        };
        match method {
            "GET" => (StatusCode::OK, Self::comment_json(&self.comments[index])),
            "PUT" | "POST" | "PATCH" => {
                if let Some(content) = str_field(body, "content") {
                    self.comments[index].content = content;
                }
                (StatusCode::OK, Self::comment_json(&self.comments[index]))
            }
            "DELETE" => {
                if query.get("force").map(String::as_str) != Some("true") {
                    return wp_error(
                        StatusCode::GONE,
                        "rest_already_trashed",
                        "The comment has already been trashed.",
                    );
                }
                let removed = self.comments.remove(index);
                (
                    StatusCode::OK,
                    json!({"deleted": true, "previous": Self::comment_json(&removed)}),
                )
            }
            _ => wp_error(StatusCode::NOT_FOUND, "rest_no_route", "No route was found."),
        }
    }
}

fn site_index() -> Value {
    json!({
        "name": "Fake WordPress",
        "description": "",
        "url": "http://fake.test",
        "namespaces": ["oembed/1.0", "wp/v2"],
        "authentication": [],
        "routes": {
            "/": {"namespace": "", "methods": ["GET"]},
            "/wp/v2": {"namespace": "wp/v2", "methods": ["GET"]},
            "/wp/v2/posts": {"namespace": "wp/v2", "methods": ["GET", "POST"]},
            "/wp/v2/categories": {"namespace": "wp/v2", "methods": ["GET", "POST"]},
            "/wp/v2/comments": {"namespace": "wp/v2", "methods": ["GET", "POST"]},
        },
    })
}

fn namespace_index() -> Value {
    json!({
        "namespace": "wp/v2",
        "routes": {
            "/wp/v2": {"namespace": "wp/v2", "methods": ["GET"]},
            "/wp/v2/posts": {"namespace": "wp/v2", "methods": ["GET", "POST"]},
        },
    })
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let method = method.as_str().to_string();
    let path = uri.path().to_string();
    let target = match uri.query() {
        Some(q) => format!("{}?{}", path, q),
        None => path.clone(),
    };
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body_json: Option<Value> = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };

    let (delay, forced, authorized) = {
        let mut s = state.lock();
        s.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(str::to_string),
            authorization: authorization.clone(),
            body: body_json.clone(),
        });
        let mut delay = None;
        let mut forced = None;
        for rule in s.rules.iter().filter(|r| r.matches(&method, &target)) {
            match rule.action {
                RuleAction::Delay(d) => delay = Some(d),
                RuleAction::Fail(status) => forced = Some(status),
            }
        }
        let authorized = method == "GET"
            || s.required_auth
                .as_deref()
                .is_none_or(|expected| authorization.as_deref() == Some(expected));
        (delay, forced, authorized)
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let (status, payload) = if let Some(code) = forced {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        wp_error(status, "fake_forced_failure", "Forced failure.")
    } else if !authorized {
        wp_error(
            StatusCode::UNAUTHORIZED,
            "rest_cannot_create",
            "Sorry, you are not allowed to do that.",
        )
    } else {
        let trimmed = path.trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        let query = parse_query(uri.query());
        let body = body_json.unwrap_or(Value::Null);
        match (method.as_str(), segments.as_slice()) {
            ("GET", ["wp-json"]) => (StatusCode::OK, site_index()),
            ("GET", ["wp-json", "wp", "v2"]) => (StatusCode::OK, namespace_index()),
            (_, ["wp-json", "wp", "v2", rest @ ..]) => {
                state.lock().dispatch(&method, rest, &query, &body)
            }
            _ => wp_error(
                StatusCode::NOT_FOUND,
                "rest_no_route",
                "No route was found matching the URL and request method.",
            ),
        }
    };

    (status, Json(payload)).into_response()
}

/// A running fake site. Stops serving when dropped.
pub struct FakeWordPress {
    addr: SocketAddr,
    state: Shared,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeWordPress {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));
        let app = Router::new().fallback(handle).with_state(state.clone());

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!("Fake WordPress server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            shutdown: Some(tx),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seed_category(&self, name: &str) -> i64 {
        let mut s = self.state.lock();
        let mut slug = slugify(name);
        while s.categories.iter().any(|c| c.slug == slug) {
            slug.push_str("-2");
        }
        s.insert_category(name, Some(slug), String::new())
            .unwrap_or_default()
    }

    pub fn seed_post(&self, title: &str, category: Option<i64>) -> i64 {
        let mut meta = Map::new();
        meta.insert("task_status".to_string(), json!("todo"));
        self.seed_post_with_meta(title, category, meta)
    }

    pub fn seed_post_with_meta(&self, title: &str, category: Option<i64>, meta: Map<String, Value>) -> i64 {
        let mut s = self.state.lock();
        let id = s.allocate_id();
        s.posts.push(FakePost {
            id,
            title: title.to_string(),
            content: format!("Contenu de {}", title),
            excerpt: String::new(),
            categories: category.into_iter().collect(),
            status: "publish".to_string(),
            slug: slugify(title),
            meta,
        });
        id
    }

    pub fn seed_comment(&self, post: i64, content: &str) -> i64 {
        let mut s = self.state.lock();
        let id = s.allocate_id();
        s.comments.push(FakeComment {
            id,
            post,
            author_name: "Utilisateur".to_string(),
            content: content.to_string(),
        });
        id
    }

    /// Answer `status` to every request whose method matches and whose
    /// path and query contain `fragment`. An empty method matches any.
    pub fn fail(&self, method: &str, fragment: &str, status: u16) {
        self.add_rule(method, fragment, RuleAction::Fail(status));
    }

    /// Hold matching requests for `duration` before answering.
    pub fn delay(&self, fragment: &str, duration: Duration) {
        self.add_rule("", fragment, RuleAction::Delay(duration));
    }

    pub fn clear_rules(&self) {
        self.state.lock().rules.clear();
    }

    fn add_rule(&self, method: &str, fragment: &str, action: RuleAction) {
        self.state.lock().rules.push(Rule {
            method: (!method.is_empty()).then(|| method.to_string()),
            fragment: fragment.to_string(),
            action,
        });
    }

    /// Reject writes unless they carry exactly this `Authorization` header.
    pub fn require_auth(&self, header_value: &str) {
        self.state.lock().required_auth = Some(header_value.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    pub fn category_count(&self) -> usize {
        self.state.lock().categories.len()
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().posts.len()
    }

    /// The post exactly as a `GET` would return it.
    pub fn post(&self, id: i64) -> Option<Value> {
        let s = self.state.lock();
        s.posts.iter().find(|p| p.id == id).map(FakeState::post_json)
    }
}

impl Drop for FakeWordPress {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
