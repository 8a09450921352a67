//! Scripted HTTP stand-in for the image generation service.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

pub const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub delay: Duration,
}

impl Reply {
    pub fn png() -> Self {
        Reply {
            status: 200,
            body: PNG.to_vec(),
            content_type: "image/png",
            delay: Duration::ZERO,
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Reply {
            status,
            body: format!(r#"{{"error": "{}"}}"#, message).into_bytes(),
            content_type: "application/json",
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Reply {
            status,
            body: b"unavailable".to_vec(),
            content_type: "text/plain",
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl Captured {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub struct MockService {
    pub base_url: String,
    pub captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockService {
    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }
}

/// Serves `replies` in order, one per incoming request, then stops.
pub fn start_mock(replies: Vec<Reply>) -> MockService {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);

    std::thread::spawn(move || {
        let count = replies.len();
        let mut replies = replies.into_iter();
        for mut request in server.incoming_requests().take(count) {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let content_type = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.as_str().to_string());

            sink.lock().unwrap().push(Captured {
                method: request.method().to_string(),
                path: request.url().to_string(),
                content_type,
                body,
            });

            let Some(reply) = replies.next() else { break };
            if !reply.delay.is_zero() {
                std::thread::sleep(reply.delay);
            }
            let header = format!("Content-Type: {}", reply.content_type)
                .parse::<Header>()
                .unwrap();
            let response = Response::from_data(reply.body)
                .with_status_code(reply.status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    MockService {
        base_url: format!("http://{}", addr),
        captured,
    }
}
