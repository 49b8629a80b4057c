//! API route definitions

use axum::routing::get;
use axum::Router;

use super::handlers;
use super::server::AppState;
use super::websocket;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::page::list_pages))
        .route("/health", get(handlers::health::health_check))
        .route("/status", get(handlers::health::status))
        .route(
            "/page/:title",
            get(handlers::page::get_page)
                .post(handlers::page::save_page)
                .delete(handlers::page::delete_page),
        )
        // Live presence and edit relay
        .route("/ws/:title", get(websocket::page::page_ws))
        .fallback(handlers::not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::config::{ApiServerConfig, Config, DatabaseConfig, HubConfig, LogConfig};
    use crate::database::Database;
    use crate::hub::BroadcastHub;
    use crate::repository::PageRepository;

    async fn test_state() -> AppState {
        let db = Database::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();

        AppState {
            store: Arc::new(PageRepository::new(db.pool().clone())),
            db,
            config: Config {
                api: ApiServerConfig {
                    port: 8080,
                    host: "127.0.0.1".to_string(),
                    cors_origins: vec![],
                    request_timeout: 30,
                },
                database: DatabaseConfig {
                    path: ":memory:".to_string(),
                    max_connections: 1,
                },
                hub: HubConfig::default(),
                log: LogConfig {
                    level: "debug".to_string(),
                    format: "pretty".to_string(),
                },
            },
            started_at: Instant::now(),
            hub: Arc::new(BroadcastHub::new(HubConfig::default())),
        }
    }

    async fn send(app: &Router, method: Method, uri: &str, body: &str) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_page_crud_flow() {
        let app = create_router(test_state().await);

        let response = send(
            &app,
            Method::POST,
            "/page/Home",
            r##"{"title":"Home","markdown":"# Welcome"}"##,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let echoed: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(echoed["title"], "Home");
        assert_eq!(echoed["markdown"], "# Welcome");

        let response = send(&app, Method::GET, "/page/Home", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "# Welcome");

        let response = send(&app, Method::GET, "/", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        let titles: Vec<String> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(titles, vec!["Home".to_string()]);

        let response = send(&app, Method::DELETE, "/page/Home", "").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/", "").await;
        assert_eq!(body_string(response).await, "[]");
    }

    #[tokio::test]
    async fn test_path_title_is_the_storage_key() {
        let app = create_router(test_state().await);

        send(
            &app,
            Method::POST,
            "/page/Real%20Title",
            r#"{"title":"Other","markdown":"text"}"#,
        )
        .await;

        let response = send(&app, Method::GET, "/page/Real%20Title", "").await;
        assert_eq!(body_string(response).await, "text");

        let response = send(&app, Method::GET, "/page/Other", "").await;
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_missing_page_reads_empty() {
        let app = create_router(test_state().await);

        let response = send(&app, Method::GET, "/page/Nowhere", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_malformed_page_body_is_rejected() {
        let app = create_router(test_state().await);

        let response = send(&app, Method::POST, "/page/Home", "{not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
    }

    #[tokio::test]
    async fn test_health_and_status() {
        let app = create_router(test_state().await);

        let response = send(&app, Method::GET, "/health", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["service"], "wiki-server");

        let response = send(&app, Method::GET, "/status", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["connections"], 0);
        assert_eq!(body["active_pages"], 0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = create_router(test_state().await);

        let response = send(&app, Method::GET, "/nope/at/all", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ws_route_requires_upgrade() {
        let app = create_router(test_state().await);

        let response = send(&app, Method::GET, "/ws/Home", "").await;
        assert!(response.status().is_client_error());
    }

    type Client =
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

    async fn next_text(ws: &mut Client) -> String {
        use futures::StreamExt;
        use tokio_tungstenite::tungstenite::Message;

        loop {
            let msg = tokio::time::timeout(std::time::Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("socket ended")
                .expect("socket error");
            if let Message::Text(text) = msg {
                return text;
            }
        }
    }

    #[tokio::test]
    async fn test_ws_presence_relay_and_shutdown_end_to_end() {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::{connect_async, tungstenite::Message};

        let state = test_state().await;
        let hub = state.hub.clone();
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let url = format!("ws://{}/ws/home", addr);

        let (mut ws_a, _) = connect_async(url.as_str()).await.unwrap();
        assert_eq!(next_text(&mut ws_a).await, "Connections:1");

        let (mut ws_b, _) = connect_async(url.as_str()).await.unwrap();
        assert_eq!(next_text(&mut ws_a).await, "NewConnection:");
        assert_eq!(next_text(&mut ws_a).await, "Connections:2");
        assert_eq!(next_text(&mut ws_b).await, "Connections:2");

        ws_a.send(Message::Text("hello".to_string())).await.unwrap();
        assert_eq!(next_text(&mut ws_b).await, "Message:hello");

        ws_a.close(None).await.unwrap();
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        while hub.room_count("home") != 1 {
            assert!(tokio::time::Instant::now() < deadline, "closed socket never left the room");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(hub.shutdown().await, 1);
        let closed = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                match ws_b.next().await {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => continue,
                }
            }
        })
        .await;
        assert!(closed.is_ok(), "shutdown must close the remaining socket");
    }
}
