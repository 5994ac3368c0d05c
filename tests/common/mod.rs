#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// What the scripted exchange sends back for one request
pub enum Out {
    Text(String),
    Close,
}

/// Local WebSocket server answering each request through a responder
pub struct MockExchange {
    pub url: String,
    pub requests: mpsc::UnboundedReceiver<Value>,
}

pub async fn spawn_exchange<F>(responder: F) -> MockExchange
where
    F: Fn(&Value) -> Vec<Out> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();
    let responder = Arc::new(responder);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let responder = Arc::clone(&responder);
            let tx = tx.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    let Message::Text(text) = msg else { continue };
                    let Ok(request) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    let _ = tx.send(request.clone());

                    for out in responder(&request) {
                        match out {
                            Out::Text(frame) => {
                                if ws.send(Message::Text(frame)).await.is_err() {
                                    return;
                                }
                            }
                            Out::Close => {
                                let _ = ws.close(None).await;
                                return;
                            }
                        }
                    }
                }
            });
        }
    });

    MockExchange { url, requests: rx }
}

pub fn reply(request: &Value, result: Value) -> Out {
    Out::Text(json!({"id": request["id"], "result": result, "error": null}).to_string())
}

pub fn error(request: &Value, code: i64, message: &str) -> Out {
    Out::Text(
        json!({
            "id": request["id"],
            "result": null,
            "error": {"code": code, "message": message}
        })
        .to_string(),
    )
}

pub fn push(method: &str, params: Value) -> Out {
    Out::Text(json!({"method": method, "params": params, "id": null}).to_string())
}

pub fn method(request: &Value) -> &str {
    request["method"].as_str().unwrap_or_default()
}

/// A port nothing is listening on
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}
