use super::config::SessionConfig;
use super::messages::{ControllerMessage, Reply, TaskEvent};
use super::state::{SessionPhase, SessionSnapshot};
use super::transcript::{resolve_room_name, Transcript};
use crate::backend::{BackendClient, EngineCatalog, RoomDirectory, TokenIssuer};
use crate::error::{MediaError, SessionError, TransportError};
use crate::models::{Engine, OperationMode, RoomSummary};
use crate::transport::{
    decode_data_message, DataMessage, MediaEnabler, Transport, TransportEvent, TransportEvents,
    TransportFactory,
};
use futures::stream::StreamExt;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Collaborators the controller talks to
#[derive(Clone)]
pub struct SessionServices {
    pub tokens: Arc<dyn TokenIssuer>,
    pub rooms: Arc<dyn RoomDirectory>,
    pub engines: Arc<dyn EngineCatalog>,
    pub transports: Arc<dyn TransportFactory>,

    /// Replaces the transport's default camera/microphone enabling when set
    pub media: Option<Arc<dyn MediaEnabler>>,
}

impl SessionServices {
    /// Use one backend client for tokens, rooms and engines
    pub fn with_backend(backend: BackendClient, transports: Arc<dyn TransportFactory>) -> Self {
        let backend = Arc::new(backend);
        Self {
            tokens: backend.clone(),
            rooms: backend.clone(),
            engines: backend,
            transports,
            media: None,
        }
    }

    pub fn with_media_enabler(mut self, media: Arc<dyn MediaEnabler>) -> Self {
        self.media = Some(media);
        self
    }
}

/// Handle to a running session controller
///
/// Every method dispatches an intent to the controller task and returns once
/// the controller has accepted or rejected it. Outcomes of asynchronous work
/// (connecting, enabling media, listings) are observed through
/// [`SessionController::subscribe`].
#[derive(Clone)]
pub struct SessionController {
    sender: mpsc::Sender<ControllerMessage>,
    state: watch::Receiver<SessionSnapshot>,
}

impl SessionController {
    /// Spawn the controller task on the current tokio runtime
    pub fn spawn(config: SessionConfig, services: SessionServices) -> Self {
        let (sender, receiver) = mpsc::channel(config.mailbox_capacity.max(1));
        let (state_tx, state) = watch::channel(SessionSnapshot::default());

        let actor = SessionActor::new(config, services, receiver, state_tx);
        tokio::spawn(actor.run());

        Self { sender, state }
    }

    /// Start a connect attempt
    ///
    /// `room_name` is trimmed; a blank or missing name is replaced by a
    /// generated one.
    pub async fn connect(&self, room_name: Option<String>) -> Result<(), SessionError> {
        self.request(|respond_to| ControllerMessage::Connect {
            room_name,
            respond_to,
        })
        .await
    }

    /// Leave the current session. A no-op when there is none.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        self.request(|respond_to| ControllerMessage::Disconnect { respond_to })
            .await
    }

    pub async fn enable_media(&self) -> Result<(), SessionError> {
        self.request(|respond_to| ControllerMessage::EnableMedia { respond_to })
            .await
    }

    pub async fn select_engine(&self, engine: Engine) -> Result<(), SessionError> {
        self.request(|respond_to| ControllerMessage::SelectEngine { engine, respond_to })
            .await
    }

    /// Select an engine from the loaded catalog by id
    pub async fn select_engine_by_id(&self, engine_id: &str) -> Result<(), SessionError> {
        let engine_id = engine_id.to_string();
        self.request(|respond_to| ControllerMessage::SelectEngineById {
            engine_id,
            respond_to,
        })
        .await
    }

    pub async fn select_operation(&self, operation: OperationMode) -> Result<(), SessionError> {
        self.request(|respond_to| ControllerMessage::SelectOperation {
            operation,
            respond_to,
        })
        .await
    }

    pub async fn refresh_rooms(&self) -> Result<(), SessionError> {
        self.request(|respond_to| ControllerMessage::RefreshRooms { respond_to })
            .await
    }

    pub async fn refresh_engines(&self) -> Result<(), SessionError> {
        self.request(|respond_to| ControllerMessage::RefreshEngines { respond_to })
            .await
    }

    pub async fn clear_transcript(&self) -> Result<(), SessionError> {
        self.request(|respond_to| ControllerMessage::ClearTranscript { respond_to })
            .await
    }

    /// Stop the controller, disconnecting any live session first
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ControllerMessage::Shutdown { respond_to: tx })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    async fn request(
        &self,
        build: impl FnOnce(Reply) -> ControllerMessage,
    ) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }
}

/// A pending or live session
struct ActiveSession {
    attempt: u64,
    room_name: String,
    room_id: Option<String>,
    transport: Arc<dyn Transport>,
    event_task: JoinHandle<()>,
}

/// Lifecycle state; the session handle only exists in the variants that own one
enum Lifecycle {
    Idle,
    Connecting(ActiveSession),
    Connected(ActiveSession),
    MediaEnabling(ActiveSession),
    Failed,
}

impl Lifecycle {
    fn phase(&self) -> SessionPhase {
        match self {
            Lifecycle::Idle => SessionPhase::Idle,
            Lifecycle::Connecting(_) => SessionPhase::Connecting,
            Lifecycle::Connected(_) => SessionPhase::Connected,
            Lifecycle::MediaEnabling(_) => SessionPhase::MediaEnabling,
            Lifecycle::Failed => SessionPhase::DisconnectedWithError,
        }
    }

    fn session(&self) -> Option<&ActiveSession> {
        match self {
            Lifecycle::Connecting(s) | Lifecycle::Connected(s) | Lifecycle::MediaEnabling(s) => {
                Some(s)
            }
            Lifecycle::Idle | Lifecycle::Failed => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut ActiveSession> {
        match self {
            Lifecycle::Connecting(s) | Lifecycle::Connected(s) | Lifecycle::MediaEnabling(s) => {
                Some(s)
            }
            Lifecycle::Idle | Lifecycle::Failed => None,
        }
    }

    fn into_session(self) -> Option<ActiveSession> {
        match self {
            Lifecycle::Connecting(s) | Lifecycle::Connected(s) | Lifecycle::MediaEnabling(s) => {
                Some(s)
            }
            Lifecycle::Idle | Lifecycle::Failed => None,
        }
    }

    fn attempt(&self) -> Option<u64> {
        self.session().map(|s| s.attempt)
    }
}

/// The controller task: sole owner of session state
struct SessionActor {
    config: SessionConfig,
    services: SessionServices,
    receiver: mpsc::Receiver<ControllerMessage>,
    events_tx: mpsc::UnboundedSender<TaskEvent>,
    events_rx: mpsc::UnboundedReceiver<TaskEvent>,
    state_tx: watch::Sender<SessionSnapshot>,

    lifecycle: Lifecycle,
    last_attempt: u64,
    engine: Option<Engine>,
    operation: OperationMode,
    last_error: Option<String>,
    transcript: Transcript,
    subscribed_tracks: usize,

    rooms: Vec<RoomSummary>,
    rooms_request: u64,
    rooms_loading: bool,

    engines: Vec<Engine>,
    engines_request: u64,
    engines_loading: bool,
    engines_error: Option<String>,
}

impl SessionActor {
    fn new(
        config: SessionConfig,
        services: SessionServices,
        receiver: mpsc::Receiver<ControllerMessage>,
        state_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            config,
            services,
            receiver,
            events_tx,
            events_rx,
            state_tx,
            lifecycle: Lifecycle::Idle,
            last_attempt: 0,
            engine: None,
            operation: OperationMode::default(),
            last_error: None,
            transcript: Transcript::new(),
            subscribed_tracks: 0,
            rooms: Vec::new(),
            rooms_request: 0,
            rooms_loading: false,
            engines: Vec::new(),
            engines_request: 0,
            engines_loading: false,
            engines_error: None,
        }
    }

    async fn run(mut self) {
        info!("Session controller started");

        if self.config.load_on_start {
            self.refresh_engines();
            self.refresh_rooms();
        }
        self.publish();

        loop {
            tokio::select! {
                // Background results first so an intent never overtakes a
                // result that was already delivered
                biased;

                Some(event) = self.events_rx.recv() => {
                    self.handle_task_event(event);
                }

                msg = self.receiver.recv() => {
                    let Some(message) = msg else {
                        info!("All controller handles dropped, shutting down");
                        self.shutdown().await;
                        break;
                    };
                    if self.handle_message(message).await.is_break() {
                        break;
                    }
                }
            }

            self.publish();
        }

        info!("Session controller stopped");
    }

    async fn handle_message(&mut self, message: ControllerMessage) -> ControlFlow<()> {
        match message {
            ControllerMessage::Connect {
                room_name,
                respond_to,
            } => {
                let result = self.connect(room_name);
                self.reply(respond_to, result);
            }
            ControllerMessage::Disconnect { respond_to } => {
                self.disconnect();
                self.reply(respond_to, Ok(()));
            }
            ControllerMessage::EnableMedia { respond_to } => {
                let result = self.enable_media();
                self.reply(respond_to, result);
            }
            ControllerMessage::SelectEngine { engine, respond_to } => {
                let result = self.select_engine(engine);
                self.reply(respond_to, result);
            }
            ControllerMessage::SelectEngineById {
                engine_id,
                respond_to,
            } => {
                let result = match self.engines.iter().find(|e| e.id == engine_id).cloned() {
                    Some(engine) => self.select_engine(engine),
                    None => Err(SessionError::UnknownEngine(engine_id)),
                };
                self.reply(respond_to, result);
            }
            ControllerMessage::SelectOperation {
                operation,
                respond_to,
            } => {
                let result = self.select_operation(operation);
                self.reply(respond_to, result);
            }
            ControllerMessage::RefreshRooms { respond_to } => {
                self.refresh_rooms();
                self.reply(respond_to, Ok(()));
            }
            ControllerMessage::RefreshEngines { respond_to } => {
                self.refresh_engines();
                self.reply(respond_to, Ok(()));
            }
            ControllerMessage::ClearTranscript { respond_to } => {
                self.transcript.clear();
                self.reply(respond_to, Ok(()));
            }
            ControllerMessage::Shutdown { respond_to } => {
                self.shutdown().await;
                let _ = respond_to.send(());
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    /// Publish state before replying so callers observe the effect of their intent
    fn reply(&self, respond_to: Reply, result: Result<(), SessionError>) {
        self.publish();
        let _ = respond_to.send(result);
    }

    fn connect(&mut self, requested: Option<String>) -> Result<(), SessionError> {
        if self.lifecycle.phase().is_active() {
            warn!(
                phase = ?self.lifecycle.phase(),
                "Ignoring connect request: a session is already active"
            );
            return Err(SessionError::AlreadyActive);
        }

        let Some(engine) = self.engine.clone() else {
            let err = SessionError::NoEngineSelected;
            warn!("Connect rejected: {}", err);
            self.last_error = Some(err.to_string());
            return Err(err);
        };

        self.last_error = None;
        self.transcript.clear();
        self.subscribed_tracks = 0;

        let room_name = resolve_room_name(requested.as_deref(), &self.config.room_name_prefix);

        let server_url = match self
            .config
            .server_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
        {
            Some(url) => url.to_string(),
            None => {
                let err = SessionError::Configuration("transport server URL");
                error!("Failed to connect to room {}: {}", room_name, err);
                self.last_error = Some(err.to_string());
                self.lifecycle = Lifecycle::Failed;
                return Err(err);
            }
        };

        self.last_attempt += 1;
        let attempt = self.last_attempt;

        let (transport, events) = self.services.transports.create(&self.config.transport);
        info!(
            attempt,
            engine = %engine.id,
            operation = %self.operation,
            "Connecting to room {} via {}",
            room_name,
            transport.name()
        );

        let event_task = tokio::spawn(forward_events(attempt, events, self.events_tx.clone()));

        tokio::spawn(run_connect_attempt(
            attempt,
            Arc::clone(&self.services.tokens),
            Arc::clone(&transport),
            engine.id,
            self.operation,
            room_name.clone(),
            server_url,
            self.events_tx.clone(),
        ));

        self.lifecycle = Lifecycle::Connecting(ActiveSession {
            attempt,
            room_name,
            room_id: None,
            transport,
            event_task,
        });

        Ok(())
    }

    fn disconnect(&mut self) {
        if !self.lifecycle.phase().is_active() {
            debug!("Disconnect requested with no active session");
            return;
        }

        if let Some(session) = std::mem::replace(&mut self.lifecycle, Lifecycle::Idle).into_session()
        {
            info!(attempt = session.attempt, "Disconnecting from room {}", session.room_name);
            release(session);
        }

        self.end_session();
    }

    fn enable_media(&mut self) -> Result<(), SessionError> {
        let session = match std::mem::replace(&mut self.lifecycle, Lifecycle::Idle) {
            Lifecycle::Connected(session) => session,
            other => {
                let err = if matches!(other, Lifecycle::MediaEnabling(_)) {
                    SessionError::MediaPending
                } else {
                    SessionError::NotConnected
                };
                self.lifecycle = other;
                return Err(err);
            }
        };

        info!("Enabling camera and microphone in room {}", session.room_name);

        let attempt = session.attempt;
        let transport = Arc::clone(&session.transport);
        let enabler = self.services.media.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = match enabler {
                Some(enabler) => enabler.enable_media(transport).await,
                None => transport.enable_camera_and_microphone().await,
            };
            let _ = events_tx.send(TaskEvent::MediaResolved { attempt, result });
        });

        self.lifecycle = Lifecycle::MediaEnabling(session);
        Ok(())
    }

    fn select_engine(&mut self, engine: Engine) -> Result<(), SessionError> {
        if self.lifecycle.phase().is_active() {
            return Err(SessionError::SelectionLocked);
        }
        debug!("Selected audio model {} ({})", engine.name, engine.id);
        self.engine = Some(engine);
        Ok(())
    }

    fn select_operation(&mut self, operation: OperationMode) -> Result<(), SessionError> {
        if self.lifecycle.phase().is_active() {
            return Err(SessionError::SelectionLocked);
        }
        debug!("Selected operation {}", operation);
        self.operation = operation;
        Ok(())
    }

    fn refresh_rooms(&mut self) {
        self.rooms_request += 1;
        self.rooms_loading = true;

        let request = self.rooms_request;
        let directory = Arc::clone(&self.services.rooms);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = directory.list_rooms().await;
            let _ = events_tx.send(TaskEvent::RoomsLoaded { request, result });
        });
    }

    fn refresh_engines(&mut self) {
        self.engines_request += 1;
        self.engines_loading = true;
        self.engines_error = None;

        let request = self.engines_request;
        let catalog = Arc::clone(&self.services.engines);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = catalog.list_engines().await;
            let _ = events_tx.send(TaskEvent::EnginesLoaded { request, result });
        });
    }

    fn handle_task_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::ConnectResolved {
                attempt,
                transport,
                result,
            } => self.on_connect_resolved(attempt, transport, result),
            TaskEvent::Transport { attempt, event } => self.on_transport_event(attempt, event),
            TaskEvent::TransportClosed { attempt } => self.on_transport_closed(attempt),
            TaskEvent::MediaResolved { attempt, result } => self.on_media_resolved(attempt, result),
            TaskEvent::RoomsLoaded { request, result } => {
                if request != self.rooms_request {
                    debug!(request, "Discarding superseded room listing");
                    return;
                }
                self.rooms_loading = false;
                match result {
                    Ok(rooms) => {
                        debug!("Available rooms: {}", rooms.len());
                        self.rooms = rooms;
                    }
                    Err(e) => warn!("Failed to list rooms: {}", e),
                }
            }
            TaskEvent::EnginesLoaded { request, result } => {
                if request != self.engines_request {
                    debug!(request, "Discarding superseded engine listing");
                    return;
                }
                self.engines_loading = false;
                match result {
                    Ok(engines) => {
                        info!("Loaded {} audio models", engines.len());
                        if self.engine.is_none() && !self.lifecycle.phase().is_active() {
                            self.engine = engines.first().cloned();
                        }
                        self.engines = engines;
                    }
                    Err(e) => {
                        error!("Failed to load audio models: {}", e);
                        self.engines_error = Some(e.to_string());
                    }
                }
            }
        }
    }

    fn on_connect_resolved(
        &mut self,
        attempt: u64,
        transport: Arc<dyn Transport>,
        result: Result<Option<String>, SessionError>,
    ) {
        if self.lifecycle.attempt() != Some(attempt) {
            debug!(attempt, "Discarding stale connect result");
            if result.is_ok() {
                tokio::spawn(disconnect_transport(transport));
            }
            return;
        }

        match result {
            Ok(room_id) => self.establish(room_id),
            Err(e) => {
                if let Some(session) =
                    std::mem::replace(&mut self.lifecycle, Lifecycle::Failed).into_session()
                {
                    error!("Failed to connect to room {}: {}", session.room_name, e);
                    release(session);
                }
                self.last_error = Some(e.to_string());
                self.transcript.clear();
                self.subscribed_tracks = 0;
            }
        }
    }

    /// Move a pending session to Connected
    fn establish(&mut self, room_id: Option<String>) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Idle) {
            Lifecycle::Connecting(mut session) => {
                session.room_id = room_id;
                info!(attempt = session.attempt, "Connected to room {}", session.room_name);
                self.lifecycle = Lifecycle::Connected(session);
                self.last_error = None;
                self.refresh_rooms();
            }
            mut other => {
                // Already established by whichever confirmation came first
                if let (Some(session), Some(room_id)) = (other.session_mut(), room_id) {
                    session.room_id = Some(room_id);
                }
                self.lifecycle = other;
            }
        }
    }

    fn on_transport_event(&mut self, attempt: u64, event: TransportEvent) {
        if self.lifecycle.attempt() != Some(attempt) {
            debug!(attempt, "Ignoring event from a discarded session: {:?}", event);
            return;
        }

        match event {
            TransportEvent::Connected => {
                if self.lifecycle.phase() == SessionPhase::Connecting {
                    self.establish(None);
                }
            }
            TransportEvent::Disconnected { reason } => {
                if let Some(session) =
                    std::mem::replace(&mut self.lifecycle, Lifecycle::Idle).into_session()
                {
                    session.event_task.abort();
                    match &reason {
                        Some(reason) => warn!("Disconnected from room {}: {}", session.room_name, reason),
                        None => info!("Disconnected from room {}", session.room_name),
                    }
                }
                if let Some(reason) = reason {
                    self.last_error = Some(TransportError::Disconnect(reason).to_string());
                    self.lifecycle = Lifecycle::Failed;
                }
                self.end_session();
            }
            TransportEvent::DataReceived { payload, sender } => {
                if self.lifecycle.phase().has_session() {
                    self.on_data(&payload, sender.as_deref());
                } else {
                    debug!("Ignoring data received before the session was established");
                }
            }
            TransportEvent::TrackSubscribed { participant, track } => {
                if self.lifecycle.phase().has_session() {
                    self.subscribed_tracks += 1;
                    debug!("Subscribed to track {} from {}", track, participant);
                }
            }
        }
    }

    /// The event feed ended without a disconnect event; nothing more can arrive
    fn on_transport_closed(&mut self, attempt: u64) {
        if self.lifecycle.attempt() != Some(attempt) {
            debug!(attempt, "Event feed of a discarded session closed");
            return;
        }

        if let Some(session) =
            std::mem::replace(&mut self.lifecycle, Lifecycle::Failed).into_session()
        {
            warn!("Event feed for room {} closed unexpectedly", session.room_name);
            release(session);
        }
        self.last_error = Some(TransportError::FeedClosed.to_string());
        self.end_session();
    }

    fn on_data(&mut self, payload: &[u8], sender: Option<&str>) {
        match decode_data_message(payload) {
            Ok(DataMessage::Transcription { text }) => {
                debug!(
                    sender = sender.unwrap_or("unknown"),
                    "Received transcription: {}", text
                );
                self.transcript.push(&text);
            }
            Ok(DataMessage::Other) => {
                debug!("Ignoring non-transcription data message");
            }
            Err(e) => {
                warn!(
                    sender = sender.unwrap_or("unknown"),
                    "Dropping malformed data message: {}", e
                );
            }
        }
    }

    fn on_media_resolved(&mut self, attempt: u64, result: Result<(), MediaError>) {
        if self.lifecycle.attempt() != Some(attempt) {
            debug!(attempt, "Discarding media result from a discarded session");
            return;
        }

        if let Lifecycle::MediaEnabling(session) =
            std::mem::replace(&mut self.lifecycle, Lifecycle::Idle)
        {
            self.lifecycle = Lifecycle::Connected(session);
        }

        match result {
            Ok(()) => info!("Camera and microphone enabled"),
            Err(e) => {
                error!("Failed to enable media: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Shared bookkeeping once a session is gone, whoever ended it
    fn end_session(&mut self) {
        self.transcript.clear();
        self.subscribed_tracks = 0;
        self.refresh_rooms();
    }

    async fn shutdown(&mut self) {
        if let Some(session) = std::mem::replace(&mut self.lifecycle, Lifecycle::Idle).into_session()
        {
            info!("Closing session in room {} before shutdown", session.room_name);
            session.event_task.abort();
            disconnect_transport(session.transport).await;
        }
        self.transcript.clear();
        self.subscribed_tracks = 0;
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.state_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn snapshot(&self) -> SessionSnapshot {
        let session = self.lifecycle.session();

        SessionSnapshot {
            phase: self.lifecycle.phase(),
            room_name: session.map(|s| s.room_name.clone()),
            room_id: session.and_then(|s| s.room_id.clone()),
            selected_engine: self.engine.clone(),
            selected_operation: self.operation,
            last_error: self.last_error.clone(),
            transcript: self.transcript.as_str().to_string(),
            transcript_words: self.transcript.word_count(),
            subscribed_tracks: self.subscribed_tracks,
            rooms: self.rooms.clone(),
            rooms_loading: self.rooms_loading,
            engines: self.engines.clone(),
            engines_loading: self.engines_loading,
            engines_error: self.engines_error.clone(),
        }
    }
}

/// Stop forwarding events and close the transport in the background
fn release(session: ActiveSession) {
    session.event_task.abort();
    tokio::spawn(disconnect_transport(session.transport));
}

async fn disconnect_transport(transport: Arc<dyn Transport>) {
    if let Err(e) = transport.disconnect().await {
        warn!("Failed to disconnect {}: {}", transport.name(), e);
    }
}

/// Tag each transport event with its attempt and feed it to the controller
async fn forward_events(
    attempt: u64,
    mut events: TransportEvents,
    events_tx: mpsc::UnboundedSender<TaskEvent>,
) {
    while let Some(event) = events.next().await {
        if events_tx.send(TaskEvent::Transport { attempt, event }).is_err() {
            return;
        }
    }
    let _ = events_tx.send(TaskEvent::TransportClosed { attempt });
}

#[allow(clippy::too_many_arguments)]
async fn run_connect_attempt(
    attempt: u64,
    tokens: Arc<dyn TokenIssuer>,
    transport: Arc<dyn Transport>,
    engine_id: String,
    operation: OperationMode,
    room_name: String,
    server_url: String,
    events_tx: mpsc::UnboundedSender<TaskEvent>,
) {
    let result = async {
        let grant = tokens
            .request_token(&engine_id, operation, &room_name)
            .await?;
        transport.connect(&server_url, &grant.credential).await?;
        Ok::<_, SessionError>(grant.room_id)
    }
    .await;

    let _ = events_tx.send(TaskEvent::ConnectResolved {
        attempt,
        transport,
        result,
    });
}
