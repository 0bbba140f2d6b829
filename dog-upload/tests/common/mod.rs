use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;

/// A request as the server received it
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Request line and headers, lowercased
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Canned response; the server replays a list of these in order
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl MockResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Clone)]
struct Recorder {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    responses: Arc<Vec<MockResponse>>,
}

/// Loopback axum server recording every request
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockServer {
    /// Answer every request with the same response
    pub async fn start(status: u16, headers: &[(&str, &str)], body: &str) -> Self {
        let response = headers
            .iter()
            .fold(MockResponse::new(status, body), |r, (name, value)| r.with_header(name, value));
        Self::sequence(vec![response]).await
    }

    /// Answer the n-th request with the n-th response; the last one repeats
    pub async fn sequence(responses: Vec<MockResponse>) -> Self {
        assert!(!responses.is_empty());

        let recorder = Recorder {
            requests: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(responses),
        };
        let requests = recorder.requests.clone();
        let router = Router::new().fallback(respond).with_state(recorder);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { base_url, requests }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(State(recorder): State<Recorder>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let mut head = format!("{} {} {:?}\r\n", parts.method, parts.uri, parts.version);
    for (name, value) in &parts.headers {
        head.push_str(&format!("{}: {}\r\n", name, value.to_str().unwrap_or_default()));
    }
    let body = to_bytes(body, usize::MAX).await.unwrap();

    let index = {
        let mut requests = recorder.requests.lock().unwrap();
        requests.push(CapturedRequest {
            head: head.to_ascii_lowercase(),
            body: body.to_vec(),
        });
        requests.len() - 1
    };

    let canned = &recorder.responses[index.min(recorder.responses.len() - 1)];
    let mut response = Response::builder().status(canned.status);
    for (name, value) in &canned.headers {
        response = response.header(name.as_str(), value.as_str());
    }
    response.body(Body::from(canned.body.clone())).unwrap()
}
