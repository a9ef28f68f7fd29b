use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ::common::storage::filesystem::FilesystemBlobStore;
use reqwest::Client;
use serde_json::{Value, json};
use tempfile::TempDir;

use mis_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, DisplayConfig, SearchConfig, ServerConfig,
    StorageConfig,
};
use mis_server::state::AppState;

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0\x01\x01\0\0\x01\0\x01\0\0";

pub fn b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub mod routes {
    pub const INSERT: &str = "/insert";
    pub const HIDE: &str = "/hide";
    pub const DELETE: &str = "/delete";
    pub const SEARCH: &str = "/search";
    pub const REGISTER: &str = "/auth/register";
    pub const LOGIN: &str = "/auth/login";

    pub fn view(file: &str) -> String {
        format!("/{file}")
    }
}

/// A running test server backed by a private SQLite file and image directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub image_dir: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = res
            .bytes()
            .await
            .expect("Failed to read response body")
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            content_type,
            bytes,
            body,
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn status_simple(&self) -> &str {
        self.body["status-simple"].as_str().unwrap_or_default()
    }
}

pub fn test_config(dir: &TempDir) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            trust_headers: false,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: format!(
                "sqlite://{}?mode=rwc",
                dir.path().join("mis.db").display()
            ),
        },
        auth: AuthConfig {
            jwt_secret: "test-secret-for-integration-tests".to_string(),
            require_auth: false,
            token_ttl_days: 1,
        },
        storage: StorageConfig {
            image_dir: dir.path().join("images"),
            max_image_size: 1024 * 1024,
        },
        search: SearchConfig { allow_search: true },
        display: DisplayConfig {
            date_format: "%Y-%m-%d".to_string(),
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a tweaked configuration.
    pub async fn spawn_with(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = test_config(&dir);
        tweak(&mut config);

        let db = mis_server::database::init_db(&config.database.url)
            .await
            .expect("Failed to initialize database");
        let blob_store = FilesystemBlobStore::new(
            config.storage.image_dir.clone(),
            config.storage.max_image_size,
        )
        .await
        .expect("Failed to create image directory");

        let image_dir = config.storage.image_dir.clone();
        let state = AppState::new(config, db, Arc::new(blob_store));
        let app = mis_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            image_dir,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Register a user and return their auth token.
    pub async fn create_user(&self, username: &str) -> String {
        let creds = json!({"username": username, "password": "password123"});
        let res = self.post(routes::REGISTER, &creds).await;
        assert_eq!(res.status, 201, "Registration failed: {}", res.text());

        let res = self.post(routes::LOGIN, &creds).await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text());
        res.body["auth-token"]
            .as_str()
            .expect("Login response has no auth-token")
            .to_string()
    }

    pub async fn insert_as(
        &self,
        username: &str,
        token: &str,
        name: &str,
        format: &str,
        image: &[u8],
    ) -> TestResponse {
        self.post(
            routes::INSERT,
            &json!({
                "image": b64(image),
                "image-name": name,
                "image-format": format,
                "client-name": "integration",
                "username": username,
                "auth-token": token,
            }),
        )
        .await
    }

    pub fn blob_exists(&self, file_name: &str) -> bool {
        self.image_dir.join(file_name).exists()
    }
}
