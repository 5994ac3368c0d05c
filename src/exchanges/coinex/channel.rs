use crate::core::errors::ExchangeError;
use crate::core::kernel::{TungsteniteWs, WsCodec, WsConfig, WsSession};
use crate::core::types::{ChannelState, Frame, PushHandler, Request};
use crate::exchanges::coinex::codec::{decode_frame, CoinexCodec};
use crate::exchanges::coinex::signer::CoinexSigner;
use crate::exchanges::coinex::types::Endpoint;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, instrument, warn};

/// Upper bound of the request id space (ids are drawn from `1..=MAX_REQUEST_ID`)
pub const MAX_REQUEST_ID: u64 = 10_000;

const AUTH_METHOD: &str = "server.sign";

type ReplySender = oneshot::Sender<Result<Value, ExchangeError>>;

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Reply deadline per request; `None` waits forever
    pub request_timeout: Option<Duration>,
    pub ws: WsConfig,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(10)),
            ws: WsConfig::default(),
        }
    }
}

struct ChannelCore {
    state: ChannelState,
    pending: HashMap<u64, ReplySender>,
    handlers: HashMap<String, PushHandler>,
    outbound: Option<mpsc::UnboundedSender<Message>>,
}

struct ChannelInner {
    name: String,
    url: String,
    signer: Option<CoinexSigner>,
    config: ChannelConfig,
    codec: CoinexCodec,
    // All mutable channel state sits behind this one lock; frames are
    // dispatched one at a time by the connection task.
    core: Mutex<ChannelCore>,
}

/// One multiplexed JSON-RPC connection.
///
/// Replies are matched to their request by `id`; pushes are routed by
/// `method` to the handler registered at subscribe time. Cloning is cheap and
/// every clone refers to the same connection.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

enum Route {
    Push(String, PushHandler),
    Reply(ReplySender),
    Unroutable,
}

impl Channel {
    fn new(endpoint: &Endpoint, signer: Option<CoinexSigner>, config: ChannelConfig) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                name: endpoint.name.clone(),
                url: endpoint.url.clone(),
                signer,
                config,
                codec: CoinexCodec,
                core: Mutex::new(ChannelCore {
                    state: ChannelState::Disconnected,
                    pending: HashMap::new(),
                    handlers: HashMap::new(),
                    outbound: None,
                }),
            }),
        }
    }

    /// Connect to `endpoint` and, when a signer is given, run the
    /// `server.sign` handshake before returning.
    ///
    /// A rejected handshake is logged and leaves the channel `Connected`:
    /// public topics keep working, private ones fail with
    /// `AuthenticationRequired`.
    pub async fn open(
        endpoint: &Endpoint,
        signer: Option<CoinexSigner>,
        config: ChannelConfig,
    ) -> Result<Self, ExchangeError> {
        let session = TungsteniteWs::new(endpoint.url.clone(), endpoint.name.clone(), CoinexCodec)
            .with_config(config.ws.clone());
        Self::open_with_session(endpoint, signer, config, session).await
    }

    /// Same as [`Channel::open`] over a caller-provided transport
    #[instrument(skip_all, fields(endpoint = %endpoint.name, url = %endpoint.url))]
    pub async fn open_with_session<S>(
        endpoint: &Endpoint,
        signer: Option<CoinexSigner>,
        config: ChannelConfig,
        session: S,
    ) -> Result<Self, ExchangeError>
    where
        S: WsSession<CoinexCodec> + 'static,
    {
        let channel = Self::new(endpoint, signer, config);
        channel.connect(session).await?;

        if channel.inner.signer.is_some() {
            if let Err(e) = channel.authenticate().await {
                warn!(
                    endpoint = %channel.inner.name,
                    "Authentication failed, only public topics are available: {}", e
                );
            }
        }

        Ok(channel)
    }

    async fn connect<S>(&self, mut session: S) -> Result<(), ExchangeError>
    where
        S: WsSession<CoinexCodec> + 'static,
    {
        self.inner.core.lock().await.state = ChannelState::Connecting;

        if let Err(e) = session.connect().await {
            self.inner.core.lock().await.state = ChannelState::Disconnected;
            return Err(e);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut core = self.inner.core.lock().await;
            core.outbound = Some(tx);
            core.state = ChannelState::Connected;
        }
        info!(endpoint = %self.inner.name, "WebSocket connected");

        tokio::spawn(self.clone().run(session, rx));
        Ok(())
    }

    /// Connection task: writes queued requests and dispatches inbound frames
    /// until either side goes away.
    async fn run<S>(self, mut session: S, mut outbound: mpsc::UnboundedReceiver<Message>)
    where
        S: WsSession<CoinexCodec>,
    {
        loop {
            tokio::select! {
                msg = outbound.recv() => match msg {
                    Some(msg) => {
                        if let Err(e) = session.send_raw(msg).await {
                            error!(endpoint = %self.inner.name, "Failed to write frame: {}", e);
                            break;
                        }
                    }
                    None => {
                        let _ = session.close().await;
                        break;
                    }
                },
                frame = session.next_message() => match frame {
                    Some(Ok(frame)) => self.dispatch(frame).await,
                    Some(Err(ExchangeError::ProtocolError(reason))) => {
                        debug!(endpoint = %self.inner.name, "Dropping malformed frame: {}", reason);
                    }
                    Some(Err(e)) => {
                        warn!(endpoint = %self.inner.name, "WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        info!(endpoint = %self.inner.name, "WebSocket stream ended");
                        break;
                    }
                },
            }
        }

        self.shutdown().await;
    }

    /// Reject everything still pending and mark the channel disconnected
    async fn shutdown(&self) {
        let pending: Vec<ReplySender> = {
            let mut core = self.inner.core.lock().await;
            core.state = ChannelState::Disconnected;
            core.outbound = None;
            core.pending.drain().map(|(_, tx)| tx).collect()
        };

        if !pending.is_empty() {
            warn!(
                endpoint = %self.inner.name,
                count = pending.len(),
                "Connection closed with requests in flight"
            );
        }
        for tx in pending {
            let _ = tx.send(Err(ExchangeError::ChannelClosed(self.inner.name.clone())));
        }
    }

    /// Close the connection. Requests still in flight are rejected with
    /// `ChannelClosed`.
    pub async fn close(&self) {
        let mut core = self.inner.core.lock().await;
        core.state = ChannelState::Disconnected;
        core.outbound = None;
    }

    /// Run the `server.sign` handshake with the channel's credentials
    #[instrument(skip(self), fields(endpoint = %self.inner.name))]
    pub async fn authenticate(&self) -> Result<(), ExchangeError> {
        let signer = self.inner.signer.as_ref().ok_or_else(|| {
            ExchangeError::AuthError(format!("No credentials configured for '{}'", self.inner.name))
        })?;

        let tonce = chrono::Utc::now().timestamp_millis() as u64;
        let request = Request::new(AUTH_METHOD, signer.handshake_params(tonce));
        let result = self.send(request).await?;

        if result.get("status").and_then(Value::as_str) != Some("success") {
            return Err(ExchangeError::AuthError(format!(
                "Handshake rejected: {}",
                result
            )));
        }

        let mut core = self.inner.core.lock().await;
        if core.state == ChannelState::Connected {
            core.state = ChannelState::Authenticated;
        }
        info!("Channel authenticated");
        Ok(())
    }

    /// Send a one-shot request and wait for its `result`
    pub async fn send(&self, request: Request) -> Result<Value, ExchangeError> {
        self.send_with(request, None).await
    }

    /// Send a subscribe-style request: resolves with the acknowledgment and
    /// leaves `handler` registered for every later push on `push_topic`.
    pub async fn subscribe(
        &self,
        request: Request,
        push_topic: impl Into<String>,
        handler: PushHandler,
    ) -> Result<Value, ExchangeError> {
        self.send_with(request, Some((push_topic.into(), handler)))
            .await
    }

    #[instrument(skip(self, request, push), fields(endpoint = %self.inner.name, method = %request.method))]
    pub async fn send_with(
        &self,
        request: Request,
        push: Option<(String, PushHandler)>,
    ) -> Result<Value, ExchangeError> {
        let (id, reply) = self.enqueue(&request, push).await?;
        self.await_reply(&request.method, id, reply).await
    }

    /// Assign an id, queue the encoded frame and register its resolver, all
    /// under the channel lock so a reply cannot be dispatched before the
    /// resolver exists.
    async fn enqueue(
        &self,
        request: &Request,
        push: Option<(String, PushHandler)>,
    ) -> Result<(u64, oneshot::Receiver<Result<Value, ExchangeError>>), ExchangeError> {
        let mut core = self.inner.core.lock().await;

        match core.state {
            ChannelState::Disconnected | ChannelState::Connecting => {
                return Err(ExchangeError::NotConnected(self.inner.name.clone()));
            }
            ChannelState::Connected if request.private => {
                return Err(ExchangeError::AuthenticationRequired(
                    self.inner.name.clone(),
                ));
            }
            ChannelState::Connected | ChannelState::Authenticated => {}
        }

        let outbound = core
            .outbound
            .clone()
            .ok_or_else(|| ExchangeError::NotConnected(self.inner.name.clone()))?;

        let id = allocate_id(&core.pending).ok_or_else(|| {
            ExchangeError::ProtocolError(format!(
                "All {} request ids are in flight on '{}'",
                MAX_REQUEST_ID, self.inner.name
            ))
        })?;

        let message = self.inner.codec.encode_request(id, request)?;
        outbound
            .send(message)
            .map_err(|_| ExchangeError::ChannelClosed(self.inner.name.clone()))?;

        let (tx, rx) = oneshot::channel();
        core.pending.insert(id, tx);
        if let Some((topic, handler)) = push {
            core.handlers.insert(topic, handler);
        }

        debug!(id, "Request queued");
        Ok((id, rx))
    }

    async fn await_reply(
        &self,
        method: &str,
        id: u64,
        reply: oneshot::Receiver<Result<Value, ExchangeError>>,
    ) -> Result<Value, ExchangeError> {
        let outcome = match self.inner.config.request_timeout {
            Some(deadline) => {
                if let Ok(outcome) = tokio::time::timeout(deadline, reply).await {
                    outcome
                } else {
                    self.inner.core.lock().await.pending.remove(&id);
                    return Err(ExchangeError::RequestTimeout {
                        method: method.to_string(),
                        id,
                    });
                }
            }
            None => reply.await,
        };

        outcome.map_err(|_| ExchangeError::ChannelClosed(self.inner.name.clone()))?
    }

    /// Feed one raw text frame through the demultiplexer.
    ///
    /// Malformed input is logged and dropped; it never affects pending state.
    pub async fn handle_text(&self, text: &str) {
        match decode_frame(text) {
            Ok(frame) => self.dispatch(frame).await,
            Err(e) => debug!(endpoint = %self.inner.name, "Dropping malformed frame: {}", e),
        }
    }

    async fn dispatch(&self, frame: Frame) {
        let route = {
            let mut core = self.inner.core.lock().await;
            let handler = frame
                .method
                .as_deref()
                .and_then(|method| core.handlers.get(method).cloned());

            // A registered push topic wins even when the frame carries the id
            // of a still-pending subscribe.
            match (handler, frame.id) {
                (Some(handler), _) => Route::Push(frame.method.clone().unwrap_or_default(), handler),
                (None, Some(id)) => core
                    .pending
                    .remove(&id)
                    .map_or(Route::Unroutable, Route::Reply),
                (None, None) => Route::Unroutable,
            }
        };

        match route {
            Route::Push(topic, handler) => {
                let params = frame.params;
                if catch_unwind(AssertUnwindSafe(|| handler(params))).is_err() {
                    error!(endpoint = %self.inner.name, topic = %topic, "Push handler panicked");
                }
            }
            Route::Reply(tx) => {
                let outcome = if frame.error.is_null() {
                    Ok(frame.result)
                } else {
                    Err(ExchangeError::from_remote(frame.error))
                };
                // receiver is gone if the caller already timed out
                let _ = tx.send(outcome);
            }
            Route::Unroutable => {
                debug!(
                    endpoint = %self.inner.name,
                    id = ?frame.id,
                    method = ?frame.method,
                    "Dropping unroutable frame"
                );
            }
        }
    }

    /// Drop the push handler for `topic`; returns whether one was registered
    pub async fn remove_push_handler(&self, topic: &str) -> bool {
        self.inner.core.lock().await.handlers.remove(topic).is_some()
    }

    pub async fn state(&self) -> ChannelState {
        self.inner.core.lock().await.state
    }

    /// Number of requests still waiting for a reply
    pub async fn pending_requests(&self) -> usize {
        self.inner.core.lock().await.pending.len()
    }

    /// Topics with a registered push handler, sorted
    pub async fn push_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .inner
            .core
            .lock()
            .await
            .handlers
            .keys()
            .cloned()
            .collect();
        topics.sort();
        topics
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn has_credentials(&self) -> bool {
        self.inner.signer.is_some()
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.inner.name)
            .field("url", &self.inner.url)
            .finish_non_exhaustive()
    }
}

/// Random id not currently pending; `None` once the id space is exhausted
fn allocate_id(pending: &HashMap<u64, ReplySender>) -> Option<u64> {
    if pending.len() as u64 >= MAX_REQUEST_ID {
        return None;
    }

    let mut rng = rand::thread_rng();
    loop {
        let id = rng.gen_range(1..=MAX_REQUEST_ID);
        if !pending.contains_key(&id) {
            return Some(id);
        }
    }
}
