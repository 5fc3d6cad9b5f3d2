use airborne_schema::adapters::schema_client::SCHEMA_PATH;
use airborne_schema::config::{ApiSettings, LoggingSettings, Settings};
use airborne_schema::domain::{FlatSchemaMap, PropertiesPayload};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Headers the mock backend saw on one request
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub authorization: Option<String>,
    pub organisation: Option<String>,
    pub application: Option<String>,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub properties: FlatSchemaMap,
    pub requests: Vec<RecordedRequest>,
    /// Answer every request with this status and a plain-text body
    pub fail_status: Option<u16>,
    /// Answer PUT with an empty 200 body
    pub empty_put_response: bool,
}

type SharedState = Arc<Mutex<BackendState>>;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn record(state: &mut BackendState, method: &'static str, headers: &HeaderMap) {
    state.requests.push(RecordedRequest {
        method,
        authorization: header(headers, "authorization"),
        organisation: header(headers, "x-organisation"),
        application: header(headers, "x-application"),
    });
}

fn failure(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "backend failure").into_response()
}

async fn get_schema(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    record(&mut state, "GET", &headers);
    if let Some(code) = state.fail_status {
        return failure(code);
    }
    Json(PropertiesPayload::from(state.properties.clone())).into_response()
}

async fn put_schema(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<PropertiesPayload>,
) -> Response {
    let mut state = state.lock().unwrap();
    record(&mut state, "PUT", &headers);
    if let Some(code) = state.fail_status {
        return failure(code);
    }
    state.properties = body.properties;
    if state.empty_put_response {
        return StatusCode::OK.into_response();
    }
    Json(PropertiesPayload::from(state.properties.clone())).into_response()
}

/// In-process stand-in for the configuration service
pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub state: SharedState,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_properties(FlatSchemaMap::new()).await
    }

    pub async fn with_properties(properties: FlatSchemaMap) -> Self {
        let state: SharedState = Arc::new(Mutex::new(BackendState {
            properties,
            ..Default::default()
        }));

        let app = Router::new()
            .route(SCHEMA_PATH, get(get_schema).put(put_schema))
            .with_state(state.clone());

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            addr,
            base_url,
            state,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            api: ApiSettings {
                base_url: self.base_url.clone(),
                token: Some("test-token".to_string()),
                organisation: Some("acme".to_string()),
                application: Some("shop".to_string()),
                timeout_seconds: 5,
            },
            logging: LoggingSettings {
                level: "debug".to_string(),
            },
        }
    }

    pub fn properties(&self) -> FlatSchemaMap {
        self.state.lock().unwrap().properties.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn fail_with(&self, status: u16) {
        self.state.lock().unwrap().fail_status = Some(status);
    }
}

/// Raw listener that answers 200 with a `content-length` longer than the body
/// it writes, then hangs up. Returns its base URL.
pub async fn serve_truncated_body() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n{\"properties\": {\"a\": ",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}
