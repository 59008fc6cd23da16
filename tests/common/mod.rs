use std::{net::SocketAddr, time::Duration};

use blog::{
    db_helpers::{create_post_in_db, create_user_in_db},
    bind_random_port, init_db, make_router,
    models::{Post, User},
    serve_app, AppState, CreatePostRequest, CreateUserRequest,
};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{pool::PoolConnection, Sqlite, SqlitePool};
use tempfile::TempDir;

pub struct TestApp {
    pub address: SocketAddr,
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("blog.db").display());
        let pool = init_db(&url).await.unwrap();
        let listener = bind_random_port().unwrap();
        let address = listener.local_addr().unwrap();
        let state = AppState {
            pool: pool.clone(),
            media_url: "/media/".to_string(),
        };
        tokio::spawn(serve_app(make_router(), listener, state));

        let app = TestApp {
            address,
            pool,
            _dir: dir,
        };
        app.wait_until_ready().await;
        app
    }

    async fn wait_until_ready(&self) {
        for _ in 0..100 {
            if reqwest::get(self.url("/check_health")).await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server at {} never became ready", self.address);
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(self.url(path)).await.unwrap()
    }

    pub async fn get_json(&self, path: &str) -> serde_json::Value {
        let response = self.get(path).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK, "GET {}", path);
        response.json().await.unwrap()
    }

    pub async fn conn(&self) -> PoolConnection<Sqlite> {
        self.pool.acquire().await.unwrap()
    }
}

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 4, day, 9, 0, 0).unwrap()
}

pub async fn user(app: &TestApp, username: &str, is_staff: bool) -> User {
    let mut conn = app.conn().await;
    create_user_in_db(
        &mut conn,
        CreateUserRequest {
            username: username.to_string(),
            is_staff,
        },
    )
    .await
    .unwrap()
}

pub async fn post(app: &TestApp, author: &User, slug: &str, day: u32) -> Post {
    let mut conn = app.conn().await;
    create_post_in_db(
        &mut conn,
        author.id,
        CreatePostRequest {
            title: format!("Title of {}", slug),
            text: format!("Text of {}", slug),
            slug: Some(slug.to_string()),
            image: None,
            published_at: at(day),
        },
    )
    .await
    .unwrap()
}
