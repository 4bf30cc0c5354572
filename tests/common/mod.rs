use actix_web::cookie::Cookie;
use buildvault::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, Settings,
};
use buildvault::startup::{run, Stores};
use buildvault::store::{InMemoryBuildStore, InMemoryUserStore};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub users: InMemoryUserStore,
    pub client: reqwest::Client,
}

fn test_settings(port: u16) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "buildvault".to_string(),
            max_connections: 1,
            in_memory: true,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port,
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        jwt: JwtSettings {
            access_secret: "integration-access-secret".to_string(),
            refresh_secret: "integration-refresh-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "buildvault".to_string(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let users = InMemoryUserStore::new();
    let stores = Stores {
        users: Arc::new(users.clone()),
        builds: Arc::new(InMemoryBuildStore::new()),
    };

    let server = run(listener, stores, test_settings(port)).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        users,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/auth/register",
            &json!({
                "username": username,
                "name": "Alice",
                "email": email,
                "password": password
            }),
        )
        .await
    }

    /// POST with the given cookies attached, e.g. `[("refresh_token", token)]`
    pub async fn post_with_cookies(&self, path: &str, cookies: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .header("Cookie", cookie_header(cookies))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_with_cookies(&self, path: &str, cookies: &[(&str, &str)]) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}{}", &self.address, path));
        if !cookies.is_empty() {
            request = request.header("Cookie", cookie_header(cookies));
        }
        request.send().await.expect("Failed to execute request.")
    }
}

fn cookie_header(cookies: &[(&str, &str)]) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every Set-Cookie on the response, parsed
pub fn set_cookies(response: &reqwest::Response) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_string()).ok())
        .collect()
}

pub fn find_cookie(response: &reqwest::Response, name: &str) -> Option<Cookie<'static>> {
    set_cookies(response).into_iter().find(|c| c.name() == name)
}
