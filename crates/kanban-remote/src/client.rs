use async_trait::async_trait;
use kanban_core::{ApiResult, KanbanError, KanbanResult, NormalizedError, RemoteConfig};

pub use kanban_core::config::REQUEST_TIMEOUT;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::ContentApi;
use crate::wire::{
    ApiIndex, ApiInfo, CategoryCreate, CategoryUpdate, CommentCreate, CommentUpdate, PostCreate,
    PostUpdate, RemoteCategory, RemoteComment, RemotePost,
};

/// List calls fetch a single page of this size. Anything beyond it is not
/// requested.
pub const PAGE_SIZE: u32 = 100;

pub const API_PREFIX: &str = "/wp-json/wp/v2";

pub const CONNECTION_OK: &str = "Connexion WordPress OK";

/// Answer of the connectivity probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStatus {
    pub message: String,
    pub data: Value,
}

/// WordPress REST client.
///
/// The base URL can be changed at runtime. Each request resolves its URL when
/// it starts, so requests already running keep their original target.
pub struct WpClient {
    http: Client,
    base_url: RwLock<String>,
    credentials: Option<(String, String)>,
}

impl std::fmt::Debug for WpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WpClient")
            .field("base_url", &*self.base_url.read())
            .field("authenticated", &self.credentials.is_some())
            .finish()
    }
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn page_query() -> (&'static str, String) {
    ("per_page", PAGE_SIZE.to_string())
}

fn force_query() -> [(&'static str, String); 1] {
    [("force", "true".to_string())]
}

fn normalize_transport_error(err: &reqwest::Error) -> NormalizedError {
    if let Some(status) = err.status() {
        return NormalizedError::from_status(status.as_u16(), None);
    }
    if err.is_builder() {
        return NormalizedError::unknown(None);
    }
    NormalizedError::unreachable()
}

impl WpClient {
    pub fn new(config: &RemoteConfig) -> KanbanResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| KanbanError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        let credentials = config
            .credentials()
            .map(|(user, pass)| (user.to_string(), pass.to_string()));

        tracing::debug!(
            "WordPress client for {} (auth: {}, timeout: {:?})",
            config.base_url,
            credentials.is_some(),
            config.timeout
        );

        Ok(Self {
            http,
            base_url: RwLock::new(normalize_base(&config.base_url)),
            credentials,
        })
    }

    pub fn base_url(&self) -> String {
        self.base_url.read().clone()
    }

    pub fn api_url(&self) -> String {
        format!("{}{}", self.base_url.read(), API_PREFIX)
    }

    /// Point every subsequent request at another site.
    pub fn set_base_url(&self, url: &str) {
        let normalized = normalize_base(url);
        *self.base_url.write() = normalized;
        tracing::info!("[API] WordPress URL changed: {}", self.api_url());
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url(), path)
    }

    async fn call<B>(
        &self,
        method: Method,
        url: String,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        tracing::debug!("[API] {} {}", method, url);

        let mut request = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    tracing::debug!("[API] {} {} -> {}", method, url, status.as_u16());
                    Ok(response)
                } else {
                    let details = response.json::<Value>().await.ok();
                    tracing::warn!("[API] {} {} -> {}", method, url, status.as_u16());
                    Err(NormalizedError::from_status(status.as_u16(), details))
                }
            }
            Err(err) => {
                tracing::warn!("[API] {} {} failed: {}", method, url, err);
                Err(normalize_transport_error(&err))
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let url = response.url().to_string();
        response.json::<T>().await.map_err(|err| {
            tracing::warn!("[API] Unreadable response from {}: {}", url, err);
            if err.is_timeout() {
                NormalizedError::unreachable()
            } else {
                NormalizedError::unknown(None)
            }
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        let response = self
            .call::<()>(Method::GET, self.endpoint(path), query, None)
            .await?;
        Self::decode(response).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.call(method, self.endpoint(path), &[], Some(body)).await?;
        Self::decode(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.call::<()>(Method::DELETE, self.endpoint(path), &force_query(), None)
            .await
            .map(|_| ())
    }

    /// Probe the `wp/v2` namespace root.
    pub async fn test_connection(&self) -> ApiResult<ConnectionStatus> {
        let data: Value = self.get("/", &[]).await?;
        Ok(ConnectionStatus {
            message: CONNECTION_OK.to_string(),
            data,
        })
    }

    /// Describe the site's REST index at `{base}/wp-json`.
    pub async fn api_info(&self) -> ApiResult<ApiInfo> {
        let url = format!("{}/wp-json", self.base_url());
        let response = self.call::<()>(Method::GET, url, &[], None).await?;
        let index: ApiIndex = Self::decode(response).await?;
        Ok(ApiInfo::from(index))
    }
}

#[async_trait]
impl ContentApi for WpClient {
    async fn list_categories(&self) -> ApiResult<Vec<RemoteCategory>> {
        self.get("/categories", &[page_query()]).await
    }

    async fn get_category(&self, id: i64) -> ApiResult<RemoteCategory> {
        self.get(&format!("/categories/{}", id), &[]).await
    }

    async fn create_category(&self, body: &CategoryCreate) -> ApiResult<RemoteCategory> {
        self.send(Method::POST, "/categories", body).await
    }

    async fn update_category(
        &self,
        id: i64,
        body: &CategoryUpdate,
    ) -> ApiResult<RemoteCategory> {
        self.send(Method::PUT, &format!("/categories/{}", id), body)
            .await
    }

    async fn delete_category(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/categories/{}", id)).await
    }

    async fn list_posts(&self, category: Option<i64>) -> ApiResult<Vec<RemotePost>> {
        let mut query = vec![page_query()];
        if let Some(id) = category {
            query.push(("categories", id.to_string()));
        }
        self.get("/posts", &query).await
    }

    async fn get_post(&self, id: i64) -> ApiResult<RemotePost> {
        self.get(&format!("/posts/{}", id), &[]).await
    }

    async fn create_post(&self, body: &PostCreate) -> ApiResult<RemotePost> {
        self.send(Method::POST, "/posts", body).await
    }

    async fn update_post(&self, id: i64, body: &PostUpdate) -> ApiResult<RemotePost> {
        self.send(Method::PUT, &format!("/posts/{}", id), body).await
    }

    async fn delete_post(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/posts/{}", id)).await
    }

    async fn list_comments(&self, post: i64) -> ApiResult<Vec<RemoteComment>> {
        self.get("/comments", &[("post", post.to_string()), page_query()])
            .await
    }

    async fn get_comment(&self, id: i64) -> ApiResult<RemoteComment> {
        self.get(&format!("/comments/{}", id), &[]).await
    }

    async fn create_comment(&self, body: &CommentCreate) -> ApiResult<RemoteComment> {
        self.send(Method::POST, "/comments", body).await
    }

    async fn update_comment(&self, id: i64, body: &CommentUpdate) -> ApiResult<RemoteComment> {
        self.send(Method::PUT, &format!("/comments/{}", id), body)
            .await
    }

    async fn delete_comment(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/comments/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper;
    use crate::testing::FakeWordPress;
    use kanban_core::ErrorKind;
    use kanban_domain::{NewTask, TaskPatch};
    use std::sync::Arc;
    use std::time::Duration;

    async fn setup() -> (FakeWordPress, WpClient) {
        let server = FakeWordPress::start().await.unwrap();
        let client = WpClient::new(&RemoteConfig::new(server.base_url())).unwrap();
        (server, client)
    }

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[test]
    fn test_api_url_is_derived_from_base() {
        let client =
            WpClient::new(&RemoteConfig::new("http://example.test/wordpress/")).unwrap();
        assert_eq!(client.base_url(), "http://example.test/wordpress");
        assert_eq!(client.api_url(), "http://example.test/wordpress/wp-json/wp/v2");

        client.set_base_url("https://other.test");
        assert_eq!(client.api_url(), "https://other.test/wp-json/wp/v2");
    }

    #[tokio::test]
    async fn test_get_missing_category_is_not_found() {
        let (_server, client) = setup().await;

        let err = client.get_category(999).await.unwrap_err();
        assert_eq!(err.message, "Ressource non trouvée");
        assert_eq!(err.status, Some(404));
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(
            err.details.as_ref().and_then(|d| d.get("code")).and_then(Value::as_str),
            Some("rest_term_invalid")
        );
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let client = WpClient::new(&RemoteConfig::new(closed_port_url())).unwrap();

        let err = client.list_categories().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkUnreachable);
        assert_eq!(err.status, None);
        assert_eq!(
            err.message,
            "WordPress inaccessible. Vérifiez votre connexion et l'URL WordPress."
        );

        // A failed call leaves the adapter usable.
        assert!(client.api_url().ends_with("/wp-json/wp/v2"));
    }

    #[tokio::test]
    async fn test_deadline_counts_as_unreachable() {
        let server = FakeWordPress::start().await.unwrap();
        server.seed_category("Slow");
        server.delay("/categories", Duration::from_millis(500));
        let config = RemoteConfig::new(server.base_url()).with_timeout(Duration::from_millis(50));
        let client = WpClient::new(&config).unwrap();

        let err = client.list_categories().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkUnreachable);
        assert_eq!(err.status, None);
        assert_eq!(
            err.message,
            "WordPress inaccessible. Vérifiez votre connexion et l'URL WordPress."
        );

        server.clear_rules();
        assert_eq!(client.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_requests_first_page_of_100() {
        let (server, client) = setup().await;
        let cat = server.seed_category("Todo");
        server.seed_post("One", Some(cat));

        let posts = client.list_posts(Some(cat)).await.unwrap();
        assert_eq!(posts.len(), 1);
        client.list_categories().await.unwrap();
        client.list_comments(posts[0].id).await.unwrap();

        let queries: Vec<String> = server
            .requests()
            .iter()
            .map(|r| r.path_and_query())
            .collect();
        assert!(queries.contains(&format!("/wp-json/wp/v2/posts?per_page=100&categories={}", cat)));
        assert!(queries.contains(&"/wp-json/wp/v2/categories?per_page=100".to_string()));
        assert!(queries.contains(&format!("/wp-json/wp/v2/comments?post={}&per_page=100", posts[0].id)));
    }

    #[tokio::test]
    async fn test_list_beyond_first_page_is_truncated() {
        let (server, client) = setup().await;
        for i in 0..105 {
            server.seed_category(&format!("Column {}", i));
        }
        let categories = client.list_categories().await.unwrap();
        assert_eq!(categories.len(), 100);
    }

    #[tokio::test]
    async fn test_basic_auth_header_sent_when_configured() {
        let server = FakeWordPress::start().await.unwrap();
        server.require_auth("Basic YWRtaW46c2VjcmV0");

        let anonymous = WpClient::new(&RemoteConfig::new(server.base_url())).unwrap();
        let err = anonymous
            .create_category(&mapper::category_create("Todo"))
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(401));
        assert_eq!(err.message, "Non autorisé");
        assert_eq!(err.kind, ErrorKind::Auth);

        let authed = WpClient::new(
            &RemoteConfig::new(server.base_url()).with_credentials("admin", "secret"),
        )
        .unwrap();
        let created = authed
            .create_category(&mapper::category_create("Todo"))
            .await
            .unwrap();
        assert_eq!(created.slug, "todo");

        let last = server.requests().pop().unwrap();
        assert_eq!(last.authorization.as_deref(), Some("Basic YWRtaW46c2VjcmV0"));
    }

    #[tokio::test]
    async fn test_delete_forces_removal() {
        let (server, client) = setup().await;
        let cat = server.seed_category("Doomed");
        let post = server.seed_post("Gone", Some(cat));

        client.delete_post(post).await.unwrap();
        client.delete_category(cat).await.unwrap();

        let deletes: Vec<String> = server
            .requests()
            .iter()
            .filter(|r| r.method == "DELETE")
            .map(|r| r.path_and_query())
            .collect();
        assert_eq!(
            deletes,
            vec![
                format!("/wp-json/wp/v2/posts/{}?force=true", post),
                format!("/wp-json/wp/v2/categories/{}?force=true", cat),
            ]
        );
        assert_eq!(client.get_post(post).await.unwrap_err().status, Some(404));
    }

    #[tokio::test]
    async fn test_create_post_defaults_status_meta() {
        let (server, client) = setup().await;
        let cat = server.seed_category("Todo");

        let created = client
            .create_post(&mapper::post_create(&NewTask::new("Fresh").in_column(cat)))
            .await
            .unwrap();
        assert_eq!(created.meta.get("task_status").map(String::as_str), Some("todo"));
        assert_eq!(created.category_ids, vec![cat]);
    }

    #[tokio::test]
    async fn test_partial_update_sends_only_changed_fields() {
        let (server, client) = setup().await;
        let cat = server.seed_category("Todo");
        let post = server.seed_post("Original", Some(cat));

        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            ..TaskPatch::default()
        };
        let updated = client
            .update_post(post, &mapper::post_update(&patch))
            .await
            .unwrap();
        assert_eq!(updated.title.rendered, "Renamed");
        assert_eq!(updated.category_ids, vec![cat]);

        let last = server.requests().pop().unwrap();
        assert_eq!(last.method, "PUT");
        assert_eq!(last.body, Some(serde_json::json!({"title": "Renamed"})));
    }

    #[tokio::test]
    async fn test_server_error_keeps_remote_payload() {
        let (server, client) = setup().await;
        server.fail("GET", "/categories", 500);

        let err = client.list_categories().await.unwrap_err();
        assert_eq!(err.message, "Erreur serveur WordPress");
        assert_eq!(err.kind, ErrorKind::Server);
        assert!(err.details.is_some());

        server.fail("GET", "/posts", 503);
        let err = client.list_posts(None).await.unwrap_err();
        assert_eq!(err.message, "Erreur HTTP 503");
    }

    #[tokio::test]
    async fn test_connection_probe_and_api_info() {
        let (_server, client) = setup().await;

        let status = client.test_connection().await.unwrap();
        assert_eq!(status.message, "Connexion WordPress OK");

        let info = client.api_info().await.unwrap();
        assert!(info.namespaces.contains(&"wp/v2".to_string()));
        assert!(info.routes.contains(&"/wp/v2/posts".to_string()));

        let offline = WpClient::new(&RemoteConfig::new(closed_port_url())).unwrap();
        assert!(offline.test_connection().await.unwrap_err().is_network());
        assert!(offline.api_info().await.unwrap_err().is_network());
    }

    #[tokio::test]
    async fn test_set_base_url_does_not_redirect_in_flight_request() {
        let first = FakeWordPress::start().await.unwrap();
        let second = FakeWordPress::start().await.unwrap();
        first.seed_category("From first");
        second.seed_category("From second");
        first.delay("/categories", Duration::from_millis(300));

        let client = Arc::new(WpClient::new(&RemoteConfig::new(first.base_url())).unwrap());
        let in_flight = {
            let client = client.clone();
            tokio::spawn(async move { client.list_categories().await })
        };

        while first.requests().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        client.set_base_url(&second.base_url());

        let categories = in_flight.await.unwrap().unwrap();
        assert_eq!(categories[0].display_name, "From first");

        let categories = client.list_categories().await.unwrap();
        assert_eq!(categories[0].display_name, "From second");
    }

    #[tokio::test]
    async fn test_comment_round_trip() {
        let (server, client) = setup().await;
        let post = server.seed_post("Discussed", None);

        let created = client
            .create_comment(&mapper::comment_create(post, &kanban_domain::NewComment::new("First!")))
            .await
            .unwrap();
        assert_eq!(created.parent_post_id, post);
        assert_eq!(created.author_name, "Utilisateur");

        let updated = client
            .update_comment(
                created.id,
                &CommentUpdate {
                    content: Some("Edited".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(updated.content.rendered.contains("Edited"));

        client.delete_comment(created.id).await.unwrap();
        assert!(client.list_comments(post).await.unwrap().is_empty());
        assert!(client.get_comment(created.id).await.unwrap_err().is_not_found());
    }
}
