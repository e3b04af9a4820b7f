//! Local stub of the target API for tests, served by `tiny_http` on an
//! ephemeral port from a background thread.

use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};
use tiny_http::{Header, Response, Server};

use crate::environment::CheckConfig;

/// A request as the stub saw it.
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    pub url: String,
    pub body: String,
    pub api_key: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Handle for a running stub; stops the server thread on drop.
pub struct StubServer {
    base_url: String,
    stop: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubServer {
    /// Base URL including the `/api` prefix, like the real service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Serve every request with `handler` until the returned handle is dropped.
pub fn spawn_stub<F>(handler: F) -> StubServer
where
    F: Fn(&StubRequest) -> StubResponse + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let stop = Arc::new(AtomicBool::new(false));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let join = {
        let stop = stop.clone();
        let requests = requests.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_millis(20)) else {
                    continue;
                };

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv(name))
                        .map(|h| h.value.as_str().to_string())
                };
                let seen = StubRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body,
                    api_key: header("x-api-key"),
                    user_agent: header("User-Agent"),
                };
                requests.lock().unwrap().push(seen.clone());

                let reply = handler(&seen);
                if !reply.delay.is_zero() {
                    thread::sleep(reply.delay);
                }
                let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response = Response::from_string(reply.body)
                    .with_status_code(reply.status)
                    .with_header(content_type);
                let _ = request.respond(response);
            }
        })
    };

    StubServer {
        base_url: format!("http://{addr}/api"),
        stop,
        requests,
        join: Some(join),
    }
}

/// A base URL nothing is listening on.
pub fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub fn test_config(base_url: &str) -> CheckConfig {
    CheckConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        api_key: "test-key".to_string(),
        user_agent: "QA-Portfolio-Tests/1.0".to_string(),
        max_response_time: Duration::from_secs(1),
        request_timeout: Duration::from_secs(5),
        environment: "test".to_string(),
        samples: 3,
    }
}

fn user(id: u64, email: &str, first: &str, last: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "first_name": first,
        "last_name": last,
        "avatar": format!("https://reqres.in/img/faces/{id}-image.jpg"),
    })
}

fn page(number: u64) -> Value {
    let data = if number == 1 {
        vec![
            user(1, "george.bluth@reqres.in", "George", "Bluth"),
            user(2, "janet.weaver@reqres.in", "Janet", "Weaver"),
        ]
    } else {
        vec![user(7, "michael.lawson@reqres.in", "Michael", "Lawson")]
    };
    json!({
        "page": number,
        "per_page": 6,
        "total": 12,
        "total_pages": 2,
        "data": data,
        "support": {
            "url": "https://contentcaddy.io?utm_source=reqres",
            "text": "Tired of writing endless social media content? Let Content Caddy generate it for you."
        }
    })
}

/// Mimics the public users fixture service closely enough for the full
/// check catalog to pass.
pub fn fixture_service(request: &StubRequest) -> StubResponse {
    let body: Value = serde_json::from_str(&request.body).unwrap_or(Value::Null);
    match (request.method.as_str(), request.url.as_str()) {
        ("GET", "/api/users?page=1") => StubResponse::json(200, page(1)),
        ("GET", "/api/users?page=2") => StubResponse::json(200, page(2)),
        ("GET", "/api/users/2") => StubResponse::json(
            200,
            json!({"data": user(2, "janet.weaver@reqres.in", "Janet", "Weaver")}),
        ),
        ("POST", "/api/users") => {
            let mut echoed = body.as_object().cloned().unwrap_or_default();
            echoed.insert("id".into(), json!("742"));
            echoed.insert("createdAt".into(), json!("2026-10-19T09:30:00.000Z"));
            StubResponse::json(201, Value::Object(echoed))
        }
        ("PUT", "/api/users/2") => {
            let mut echoed = body.as_object().cloned().unwrap_or_default();
            echoed.insert("updatedAt".into(), json!("2026-10-19T09:30:01.000Z"));
            StubResponse::json(200, Value::Object(echoed))
        }
        ("DELETE", "/api/users/2") => StubResponse::empty(204),
        ("POST", "/api/login") => StubResponse::json(400, json!({"error": "user not found"})),
        _ => StubResponse::json(404, json!({})),
    }
}
