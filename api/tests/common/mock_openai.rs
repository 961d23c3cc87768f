//! Minimal OpenAI-compatible chat completions server.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

/// What the mock answers with.
#[derive(Clone)]
pub enum MockReply {
    /// SSE stream with one delta per fragment, then `[DONE]`.
    Stream(Vec<String>),
    /// Non-success status with a JSON error body.
    Status(u16),
}

struct MockState {
    reply: MockReply,
    hits: AtomicUsize,
    last_body: Mutex<Option<Value>>,
}

pub struct MockOpenAi {
    pub url: String,
    state: Arc<MockState>,
}

impl MockOpenAi {
    pub async fn start(reply: MockReply) -> Self {
        let state = Arc::new(MockState {
            reply,
            hits: AtomicUsize::new(0),
            last_body: Mutex::new(None),
        });
        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Body of the most recent request, if any.
    pub fn last_body(&self) -> Option<Value> {
        self.state.last_body.lock().unwrap().clone()
    }
}

async fn chat_completions(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().unwrap() = Some(body);

    match &state.reply {
        MockReply::Stream(parts) => {
            let mut out = String::new();
            for p in parts {
                out.push_str(&format!(
                    "data: {}\n\n",
                    json!({ "choices": [{ "index": 0, "delta": { "content": p } }] })
                ));
            }
            out.push_str("data: [DONE]\n\n");
            ([(header::CONTENT_TYPE, "text/event-stream")], out).into_response()
        }
        MockReply::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap();
            (
                status,
                Json(json!({ "error": { "message": "mock failure", "type": "server_error" } })),
            )
                .into_response()
        }
    }
}
