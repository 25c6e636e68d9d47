// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live change notifications for back-office screens.
//!
//! Events are informational: they tell a connected screen that something
//! changed so it can refetch the relevant aggregate over HTTP. Nothing is
//! executed over the socket and streaming produces no audit events.

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use fieldops_domain::format_timestamp;
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::AppState;

/// Events buffered per subscriber; slow screens lose the oldest ones.
const EVENT_BUFFER_SIZE: usize = 100;

/// A change that happened in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    DemandeCreated {
        demande_id: i64,
        client_id: i64,
    },
    /// A demande was edited, rejected or cancelled.
    DemandeUpdated {
        demande_id: i64,
    },
    DemandeConverted {
        demande_id: i64,
        ticket_id: i64,
    },
    TicketCreated {
        ticket_id: i64,
    },
    /// A ticket moved state, was finished or reopened.
    TicketStateChanged {
        ticket_id: i64,
        state: String,
    },
    TicketAssigned {
        ticket_id: i64,
    },
    InterventionRecorded {
        intervention_id: i64,
        ticket_id: i64,
    },
    SatisfactionSubmitted {
        ticket_id: i64,
    },
    MessagePosted {
        conversation_id: String,
        message_id: i64,
    },
    /// Sent once when a socket connects.
    Connected {
        timestamp: String,
    },
}

/// Fan-out of [`LiveEvent`]s to every connected socket.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Sends an event to all subscribers. Never blocks; with no subscriber
    /// the event is dropped.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast live event");
            }
            Err(_) => {
                debug!(?event, "No receivers for live event");
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Upgrades `GET /live` to a WebSocket streaming [`LiveEvent`]s.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(app_state): AxumState<AppState>,
) -> Response {
    let broadcaster = app_state.live.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

async fn handle_socket(socket: WebSocket, broadcaster: std::sync::Arc<LiveEventBroadcaster>) {
    info!("Client connected to live event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

    let connected_event = LiveEvent::Connected {
        timestamp: format_timestamp(time::OffsetDateTime::now_utc()),
    };
    if let Ok(json) = serde_json::to_string(&connected_event)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => error!(?e, "Failed to serialize live event"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live subscriber lagging, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Ignoring message sent on the live stream");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    info!("Client disconnected from live event stream");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_no_receivers() {
        let broadcaster = LiveEventBroadcaster::new();
        assert_eq!(broadcaster.tx.receiver_count(), 0);
        broadcaster.broadcast(&LiveEvent::TicketCreated { ticket_id: 1 });
    }

    #[test]
    fn test_every_subscriber_receives_event() {
        let broadcaster = LiveEventBroadcaster::new();
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        broadcaster.broadcast(&LiveEvent::DemandeConverted {
            demande_id: 3,
            ticket_id: 9,
        });

        for rx in [&mut rx1, &mut rx2] {
            match rx.try_recv() {
                Ok(LiveEvent::DemandeConverted {
                    demande_id: 3,
                    ticket_id: 9,
                }) => {}
                other => panic!("Expected DemandeConverted, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_event_wire_format() {
        let event = LiveEvent::MessagePosted {
            conversation_id: String::from("ticket-4"),
            message_id: 12,
        };

        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(json["type"], "message_posted");
        assert_eq!(json["conversation_id"], "ticket-4");
        assert_eq!(json["message_id"], 12);
    }
}
