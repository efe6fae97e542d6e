#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use indexmap::IndexSet;
use tower::ServiceExt;

use dashshare_api::auth::jwt::{generate_access_token, JwtConfig};
use dashshare_api::config::ServerConfig;
use dashshare_api::notifications::{NotificationService, NotificationSink};
use dashshare_api::router::build_app_router;
use dashshare_api::services::DashboardService;
use dashshare_api::state::AppState;
use dashshare_api::ws::WsManager;
use dashshare_core::departments::Department;
use dashshare_core::roles::Role;
use dashshare_core::types::DbId;
use dashshare_db::models::company::{Company, CreateCompany};
use dashshare_db::models::dashboard::{CreateDashboard, Dashboard};
use dashshare_db::models::notification::Notification;
use dashshare_db::models::user::{CreateUser, User};
use dashshare_db::{InMemoryStore, Store};

/// Build a test `ServerConfig` with safe defaults. Nothing connects to
/// `database_url`; tests run on [`InMemoryStore`].
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 15,
            leeway_secs: 0,
        },
    }
}

/// Records every push as `(recipient_id, notification_id)`.
#[derive(Default)]
pub struct RecordingSink {
    pub pushed: Mutex<Vec<(DbId, DbId)>>,
}

impl RecordingSink {
    pub fn recipients(&self) -> Vec<DbId> {
        self.pushed.lock().unwrap().iter().map(|(r, _)| *r).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send_to_user(&self, user_id: DbId, notification: &Notification) {
        self.pushed.lock().unwrap().push((user_id, notification.id));
    }
}

/// Two companies and a cast of users, wired to services over one store.
///
/// - `acme`: `admin` (ADMIN), `alice` and `bob` (USERs invited by `admin`),
///   `dave` (USER, not invited by anyone).
/// - `globex`: `other_admin` (ADMIN) and `carol` (USER).
/// - `root`: SUPER_ADMIN without a company.
pub struct World {
    pub store: Arc<InMemoryStore>,
    pub sink: Arc<RecordingSink>,
    pub dashboards: DashboardService,
    pub notifications: NotificationService,
    pub acme: Company,
    pub globex: Company,
    pub root: User,
    pub admin: User,
    pub alice: User,
    pub bob: User,
    pub dave: User,
    pub other_admin: User,
    pub carol: User,
}

impl World {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let notifications = NotificationService::new(store.clone(), sink.clone());
        let dashboards = DashboardService::new(store.clone(), notifications.clone());

        let acme = company(&store, "Acme").await;
        let globex = company(&store, "Globex").await;

        let root = user(&store, "root@dashshare.io", Some("Root"), Role::SuperAdmin, None, None).await;
        let admin = user(&store, "admin@acme.io", Some("Ada"), Role::Admin, Some(acme.id), None).await;
        let alice = user(
            &store,
            "alice@acme.io",
            Some("Alice"),
            Role::User,
            Some(acme.id),
            Some(admin.id),
        )
        .await;
        let bob = user(
            &store,
            "bob@acme.io",
            Some("Bob"),
            Role::User,
            Some(acme.id),
            Some(admin.id),
        )
        .await;
        let dave = user(&store, "dave@acme.io", None, Role::User, Some(acme.id), None).await;
        let other_admin = user(
            &store,
            "admin@globex.io",
            Some("Gus"),
            Role::Admin,
            Some(globex.id),
            None,
        )
        .await;
        let carol = user(
            &store,
            "carol@globex.io",
            Some("Carol"),
            Role::User,
            Some(globex.id),
            Some(other_admin.id),
        )
        .await;

        Self {
            store,
            sink,
            dashboards,
            notifications,
            acme,
            globex,
            root,
            admin,
            alice,
            bob,
            dave,
            other_admin,
            carol,
        }
    }

    /// Insert a dashboard straight into the store (no creation fan-out).
    pub async fn dashboard(&self, creator: &User, title: &str, department: Department) -> Dashboard {
        self.store
            .create_dashboard(&CreateDashboard {
                title: title.to_string(),
                embed_url: format!("https://bi.example.com/embed/{}", title.to_lowercase()),
                description: None,
                department,
                tags: IndexSet::new(),
                created_by: creator.id,
                company_id: creator.company_id,
            })
            .await
            .unwrap()
    }

    /// A dashboard created by `admin` and shared with `users`.
    pub async fn shared_dashboard(&self, title: &str, users: &[&User]) -> Dashboard {
        let dashboard = self.dashboard(&self.admin, title, Department::Finance).await;
        if !users.is_empty() {
            let ids: BTreeSet<DbId> = users.iter().map(|u| u.id).collect();
            self.store
                .add_access_users(&[dashboard.id], &ids)
                .await
                .unwrap();
        }
        self.store.find_dashboard(dashboard.id).await.unwrap().unwrap()
    }

    /// Stored notifications for `user`, newest first.
    pub async fn inbox(&self, user: &User) -> Vec<Notification> {
        self.store
            .list_notifications(user.id, false, 100, 0)
            .await
            .unwrap()
    }

    /// The full HTTP app over this world's store.
    pub fn app(&self) -> Router {
        let config = test_config();
        let state = AppState::new(self.store.clone(), config.clone(), Arc::new(WsManager::new()));
        build_app_router(state, &config)
    }

    pub fn token(&self, user: &User) -> String {
        generate_access_token(user.id, user.role, &test_config().jwt).unwrap()
    }
}

async fn company(store: &InMemoryStore, name: &str) -> Company {
    store
        .create_company(&CreateCompany {
            name: name.to_string(),
            subdomain: Some(name.to_lowercase()),
        })
        .await
        .unwrap()
}

async fn user(
    store: &InMemoryStore,
    email: &str,
    name: Option<&str>,
    role: Role,
    company_id: Option<DbId>,
    invited_by: Option<DbId>,
) -> User {
    store
        .create_user(&CreateUser {
            email: email.to_string(),
            name: name.map(str::to_string),
            role,
            company_id,
            invited_by,
            is_active: true,
        })
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Send `body` verbatim as `application/json`, well-formed or not.
pub async fn post_raw(app: Router, uri: &str, token: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
