// Scripted collaborators shared by the integration tests
//
// StubBackend answers token, room and engine requests from canned results.
// ScriptedFactory hands out ScriptedTransports whose connect calls can be held
// open until the test releases them, and whose event feeds the test drives.

#![allow(dead_code)]

use futures::stream::StreamExt;
use room_scribe::{
    AccessGrant, BackendError, CatalogError, DirectoryError, Engine, EngineCatalog, IssuanceError,
    MediaEnabler, MediaError, OperationMode, RoomDirectory, RoomSummary, SessionConfig, SessionController,
    SessionServices, SessionSnapshot, TokenIssuer, Transport, TransportError, TransportEvent,
    TransportEvents, TransportFactory, TransportOptions,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub const SERVER_URL: &str = "wss://media.test";

pub fn engine(id: &str) -> Engine {
    Engine {
        id: id.to_string(),
        name: format!("{} model", id),
    }
}

pub fn room(name: &str) -> RoomSummary {
    RoomSummary {
        name: name.to_string(),
        creation_time: chrono::Utc::now(),
        num_participants: 1,
        max_participants: 10,
        active_recording: false,
    }
}

pub fn transcription(text: &str) -> TransportEvent {
    TransportEvent::DataReceived {
        payload: serde_json::json!({ "type": "transcription", "text": text })
            .to_string()
            .into_bytes(),
        sender: Some("agent".to_string()),
    }
}

/// Token request as seen by the stub backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCall {
    pub engine_id: String,
    pub operation: OperationMode,
    pub room_name: String,
}

pub struct StubBackend {
    pub token_calls: Mutex<Vec<TokenCall>>,
    pub token_error: Mutex<Option<String>>,
    pub room_calls: AtomicUsize,
    pub rooms: Mutex<Result<Vec<RoomSummary>, String>>,
    pub engines: Mutex<Result<Vec<Engine>, String>>,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            token_calls: Mutex::new(Vec::new()),
            token_error: Mutex::new(None),
            room_calls: AtomicUsize::new(0),
            rooms: Mutex::new(Ok(vec![room("standup")])),
            engines: Mutex::new(Ok(vec![engine("whisper"), engine("nova")])),
        })
    }

    pub fn fail_tokens(&self, message: &str) {
        *self.token_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_rooms(&self, message: &str) {
        *self.rooms.lock().unwrap() = Err(message.to_string());
    }

    pub fn fail_engines(&self, message: &str) {
        *self.engines.lock().unwrap() = Err(message.to_string());
    }

    pub fn token_calls(&self) -> Vec<TokenCall> {
        self.token_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TokenIssuer for StubBackend {
    async fn request_token(
        &self,
        engine_id: &str,
        operation: OperationMode,
        room_name: &str,
    ) -> Result<AccessGrant, IssuanceError> {
        self.token_calls.lock().unwrap().push(TokenCall {
            engine_id: engine_id.to_string(),
            operation,
            room_name: room_name.to_string(),
        });

        if let Some(message) = self.token_error.lock().unwrap().clone() {
            return Err(BackendError::Reported(message).into());
        }

        Ok(AccessGrant {
            credential: format!("jwt-for-{}", room_name),
            room_id: Some(format!("RM_{}", room_name)),
        })
    }
}

#[async_trait::async_trait]
impl RoomDirectory for StubBackend {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, DirectoryError> {
        self.room_calls.fetch_add(1, Ordering::SeqCst);
        self.rooms
            .lock()
            .unwrap()
            .clone()
            .map_err(|message| DirectoryError(BackendError::Reported(message)))
    }
}

#[async_trait::async_trait]
impl EngineCatalog for StubBackend {
    async fn list_engines(&self) -> Result<Vec<Engine>, CatalogError> {
        self.engines
            .lock()
            .unwrap()
            .clone()
            .map_err(|message| CatalogError(BackendError::Reported(message)))
    }
}

pub struct ScriptedTransport {
    events: Mutex<Option<mpsc::UnboundedSender<TransportEvent>>>,
    gate: Mutex<Option<oneshot::Receiver<Result<(), String>>>>,
    media_error: Option<String>,
    pub connected_with: Mutex<Option<(String, String)>>,
    /// Connect calls that have returned, successfully or not
    pub connects_finished: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub media_calls: AtomicUsize,
}

impl ScriptedTransport {
    /// Push an event into this transport's feed
    pub fn emit(&self, event: TransportEvent) {
        if let Some(events) = self.events.lock().unwrap().as_ref() {
            let _ = events.send(event);
        }
    }

    /// End the event feed without a disconnect event
    pub fn close_feed(&self) {
        self.events.lock().unwrap().take();
    }

    pub fn disconnects(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self, url: &str, credential: &str) -> Result<(), TransportError> {
        *self.connected_with.lock().unwrap() = Some((url.to_string(), credential.to_string()));

        let gate = self.gate.lock().unwrap().take();
        let result = match gate {
            Some(gate) => match gate.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(message)) => Err(TransportError::Connect(message)),
                Err(_) => Err(TransportError::Connect("gate dropped".to_string())),
            },
            None => Ok(()),
        };

        if result.is_ok() {
            self.emit(TransportEvent::Connected);
        }
        self.connects_finished.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn enable_camera_and_microphone(&self) -> Result<(), MediaError> {
        self.media_calls.fetch_add(1, Ordering::SeqCst);
        match &self.media_error {
            Some(message) => Err(MediaError(message.clone())),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
pub struct ScriptedFactory {
    /// Hold every connect call open until released
    pub gated: AtomicBool,
    pub media_error: Mutex<Option<String>>,
    pub options: Mutex<Vec<TransportOptions>>,
    transports: Mutex<Vec<Arc<ScriptedTransport>>>,
    gates: Mutex<Vec<Option<oneshot::Sender<Result<(), String>>>>>,
}

impl ScriptedFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated() -> Arc<Self> {
        let factory = Self::default();
        factory.gated.store(true, Ordering::SeqCst);
        Arc::new(factory)
    }

    pub fn created(&self) -> usize {
        self.transports.lock().unwrap().len()
    }

    pub fn transport(&self, index: usize) -> Arc<ScriptedTransport> {
        Arc::clone(&self.transports.lock().unwrap()[index])
    }

    /// Let the connect call of the `index`-th transport finish
    pub fn release(&self, index: usize, result: Result<(), String>) {
        let gate = self.gates.lock().unwrap()[index].take();
        if let Some(gate) = gate {
            let _ = gate.send(result);
        }
    }
}

impl TransportFactory for ScriptedFactory {
    fn create(&self, options: &TransportOptions) -> (Arc<dyn Transport>, TransportEvents) {
        self.options.lock().unwrap().push(options.clone());

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let gate = if self.gated.load(Ordering::SeqCst) {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push(Some(tx));
            Some(rx)
        } else {
            self.gates.lock().unwrap().push(None);
            None
        };

        let transport = Arc::new(ScriptedTransport {
            events: Mutex::new(Some(events_tx)),
            gate: Mutex::new(gate),
            media_error: self.media_error.lock().unwrap().clone(),
            connected_with: Mutex::new(None),
            connects_finished: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            media_calls: AtomicUsize::new(0),
        });
        self.transports.lock().unwrap().push(Arc::clone(&transport));

        let events = futures::stream::unfold(events_rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed();

        (transport, events)
    }
}

/// Calls that block until the test answers them, indexed in call order
pub struct Gate<T> {
    pending: Mutex<Vec<Option<oneshot::Sender<T>>>>,
    answered: AtomicUsize,
}

impl<T> Default for Gate<T> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            answered: AtomicUsize::new(0),
        }
    }
}

impl<T> Gate<T> {
    async fn pass(&self) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push(Some(tx));
        let value = rx.await.ok();
        self.answered.fetch_add(1, Ordering::SeqCst);
        value
    }

    pub fn calls(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Calls that have received their answer and returned
    pub fn answered(&self) -> usize {
        self.answered.load(Ordering::SeqCst)
    }

    pub fn answer(&self, index: usize, value: T) {
        let sender = self.pending.lock().unwrap()[index].take();
        if let Some(sender) = sender {
            let _ = sender.send(value);
        }
    }

    pub async fn wait_for_calls(&self, count: usize) {
        eventually(|| self.calls() >= count).await;
    }
}

/// Room directory whose listings are answered by the test
#[derive(Default)]
pub struct GatedDirectory(pub Gate<Vec<RoomSummary>>);

#[async_trait::async_trait]
impl RoomDirectory for GatedDirectory {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, DirectoryError> {
        self.0.pass().await.ok_or_else(|| {
            DirectoryError(BackendError::Reported("listing abandoned".to_string()))
        })
    }
}

/// Engine catalog whose listings are answered by the test
#[derive(Default)]
pub struct GatedCatalog(pub Gate<Vec<Engine>>);

#[async_trait::async_trait]
impl EngineCatalog for GatedCatalog {
    async fn list_engines(&self) -> Result<Vec<Engine>, CatalogError> {
        self.0.pass().await.ok_or_else(|| {
            CatalogError(BackendError::Reported("listing abandoned".to_string()))
        })
    }
}

/// Media enabler whose outcome is decided by the test
#[derive(Default)]
pub struct GatedMedia(pub Gate<Result<(), String>>);

#[async_trait::async_trait]
impl MediaEnabler for GatedMedia {
    async fn enable_media(&self, _transport: Arc<dyn Transport>) -> Result<(), MediaError> {
        match self.0.pass().await {
            Some(Ok(())) => Ok(()),
            Some(Err(message)) => Err(MediaError(message)),
            None => Err(MediaError("enabling abandoned".to_string())),
        }
    }
}

pub fn test_config() -> SessionConfig {
    SessionConfig {
        server_url: Some(SERVER_URL.to_string()),
        load_on_start: false,
        ..SessionConfig::default()
    }
}

pub fn services(backend: &Arc<StubBackend>, factory: &Arc<ScriptedFactory>) -> SessionServices {
    SessionServices {
        tokens: backend.clone(),
        rooms: backend.clone(),
        engines: backend.clone(),
        transports: factory.clone(),
        media: None,
    }
}

/// Controller with an engine already selected
pub async fn ready_controller(
    backend: &Arc<StubBackend>,
    factory: &Arc<ScriptedFactory>,
) -> SessionController {
    let controller = SessionController::spawn(test_config(), services(backend, factory));
    controller.select_engine(engine("whisper")).await.unwrap();
    controller
}

/// Wait until the published state satisfies `predicate`
pub async fn wait_for(
    controller: &SessionController,
    predicate: impl Fn(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    let mut rx = controller.subscribe();
    tokio::time::timeout(Duration::from_secs(2), async move {
        rx.wait_for(|snapshot| predicate(snapshot))
            .await
            .map(|snapshot| snapshot.clone())
    })
    .await
    .expect("timed out waiting for controller state")
    .expect("controller stopped")
}

/// Wait until the session is connected and the connect result has been applied
pub async fn wait_connected(controller: &SessionController) -> SessionSnapshot {
    wait_for(controller, |s| {
        s.phase == room_scribe::SessionPhase::Connected && s.room_id.is_some()
    })
    .await
}

/// Poll `condition` until it holds
pub async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for condition");
}

/// Round-trip an intent through the controller
///
/// Background results already delivered to the controller are applied before
/// any intent, so once this returns they are reflected in the snapshot. Clears
/// the transcript.
pub async fn flush(controller: &SessionController) {
    controller.clear_transcript().await.unwrap();
}

/// Give background tasks a chance to deliver anything still in flight
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
