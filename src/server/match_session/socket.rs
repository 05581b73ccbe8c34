//! WebSocket transport for match sessions.
//!
//! `MatchSocket` is the actor owning one client socket. It talks to the rest of the
//! system only through channels, so the protocol side sees a plain [`Participant`]
//! (`WsParticipant`) and never touches the actor context.
use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use super::handler::ConnectionHandler;
use super::participant::Participant;
use super::signal::Signal;
use crate::server::error::MatchError;
use crate::server::identity::player_from_query;
use crate::server::state::AppState;
use crate::server::ws_error::{match_error_response, missing_player_response};

/// Commands from the protocol side to the socket actor.
pub enum Outbound {
    Text(String),
    Close(Option<String>),
}

pub struct MatchSocket {
    connection_id: Uuid,
    inbound: mpsc::UnboundedSender<String>,
    outbound: Option<mpsc::UnboundedReceiver<Outbound>>,
    closed: Arc<Signal>,
}

pub struct WsParticipant {
    connection_id: Uuid,
    inbound: Mutex<mpsc::UnboundedReceiver<String>>,
    outbound: mpsc::UnboundedSender<Outbound>,
    closed: Arc<Signal>,
}

impl WsParticipant {
    /// Create a participant and the socket actor that will serve it once the handshake completes.
    pub fn pair() -> (Self, MatchSocket) {
        let connection_id = Uuid::new_v4();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(Signal::new());

        let participant = WsParticipant {
            connection_id,
            inbound: Mutex::new(inbound_rx),
            outbound: outbound_tx,
            closed: closed.clone(),
        };
        let socket = MatchSocket {
            connection_id,
            inbound: inbound_tx,
            outbound: Some(outbound_rx),
            closed,
        };
        (participant, socket)
    }
}

impl Actor for MatchSocket {
    type Context = ws::WebsocketContext<Self>;

    /// Attach the outbound command channel to the actor.
    fn started(&mut self, ctx: &mut Self::Context) {
        if let Some(outbound) = self.outbound.take() {
            ctx.add_stream(UnboundedReceiverStream::new(outbound));
        }
        debug!("[MatchSocket] Connection {} accepted", self.connection_id);
    }

    /// Called when the socket stops, whichever side closed it.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.closed.fire();
        debug!("[MatchSocket] Connection {} closed", self.connection_id);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for MatchSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                if self.inbound.send(text.to_string()).is_err() {
                    debug!("[MatchSocket] Dropped message on connection {}", self.connection_id);
                }
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("[MatchSocket] Protocol error on connection {}: {}", self.connection_id, e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl StreamHandler<Outbound> for MatchSocket {
    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        match msg {
            Outbound::Text(text) => ctx.text(text),
            Outbound::Close(description) => {
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Normal,
                    description,
                }));
                ctx.stop();
            }
        }
    }

    /// The participant was dropped: nothing will ever be sent again.
    fn finished(&mut self, ctx: &mut Self::Context) {
        ctx.stop();
    }
}

#[async_trait]
impl Participant for WsParticipant {
    fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    async fn send_text(&self, text: String) -> Result<(), MatchError> {
        if !self.is_open() {
            return Err(MatchError::Disconnected);
        }
        self.outbound
            .send(Outbound::Text(text))
            .map_err(|_| MatchError::Disconnected)
    }

    async fn receive_text(&self) -> Result<String, MatchError> {
        self.inbound.lock().await.recv().await.ok_or(MatchError::Disconnected)
    }

    async fn close(&self, reason: Option<String>) -> Result<(), MatchError> {
        if !self.closed.fire() {
            return Err(MatchError::Disconnected);
        }
        self.outbound
            .send(Outbound::Close(reason))
            .map_err(|_| MatchError::Disconnected)
    }

    async fn closed(&self) {
        self.closed.wait().await
    }

    fn is_open(&self) -> bool {
        !self.closed.is_fired()
    }
}

/// WebSocket endpoint for a live match.
///
/// Expects the `player` query parameter. The player joins the match session before
/// the handshake is accepted; rejections are answered with a JSON error instead of
/// an upgrade.
pub async fn ws_match(
    req: HttpRequest,
    stream: web::Payload,
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let raw_match_id = path.into_inner();
    let Some(player_id) = player_from_query(&req) else {
        return Ok(missing_player_response());
    };

    let (participant, socket) = WsParticipant::pair();
    let handler = ConnectionHandler::new(
        data.registry.clone(),
        data.store.clone(),
        player_id,
        Arc::new(participant),
    );
    let admitted = match handler.admit(&raw_match_id) {
        Ok(admitted) => admitted,
        Err(e) => return Ok(match_error_response(&e, Some(raw_match_id.as_str()))),
    };

    match ws::start(socket, &req, stream) {
        Ok(response) => {
            actix_web::rt::spawn(async move {
                // Outcome is logged by the handler itself.
                let _ = admitted.run().await;
            });
            Ok(response)
        }
        Err(e) => {
            warn!("[MatchSocket] Handshake failed for match {}: {}", raw_match_id, e);
            actix_web::rt::spawn(admitted.abandon());
            Err(e)
        }
    }
}
