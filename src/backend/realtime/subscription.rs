/**
 * Real-time Subscription Handler
 *
 * Implements `GET /api/realtime`, a Server-Sent Events stream of the
 * caller's change notifications.
 *
 * # Authentication
 *
 * Browsers' `EventSource` cannot set headers, so besides the usual
 * `Authorization: Bearer` header the token may be passed as the
 * `access_token` query parameter.
 *
 * # Event Filtering
 *
 * Clients can filter events by type using the `types` query parameter:
 * - `?types=snippet,folder` - Snippet and folder changes only
 * - `?types=invitation` - Only invitations addressed to the caller
 * - No parameter - All event types
 *
 * # Connection Management
 *
 * - Keep-alive comments are sent by Axum's SSE keep-alive
 * - Lagged receivers skip ahead; the dropped count is logged
 */

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{stream, Stream};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::backend::middleware::auth::AuthUser;
use crate::backend::realtime::broadcast::RealtimeHub;
use crate::shared::{EventType, RealtimeEvent};

#[derive(Debug, Default, Deserialize)]
pub struct RealtimeQuery {
    /// Comma-separated event type names
    #[serde(default)]
    pub types: Option<String>,
}

/// Parse a `types=` filter; an empty or absent filter means "everything"
pub fn parse_type_filter(raw: Option<&str>) -> Option<Vec<EventType>> {
    raw.map(|types| types.split(',').filter_map(EventType::parse).collect::<Vec<_>>())
        .filter(|types| !types.is_empty())
}

fn to_sse(event: &RealtimeEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Event::default().event(event.event_type.name()).data(data)),
        Err(e) => {
            tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
            None
        }
    }
}

/// Handle real-time subscription (GET /api/realtime)
///
/// # Example Response
///
/// ```http
/// HTTP/1.1 200 OK
/// Content-Type: text/event-stream
///
/// event: snippet
/// data: {"event_type":"snippet","action":"created","payload":{...},"timestamp":"..."}
/// ```
pub async fn handle_realtime_subscription(
    AuthUser(user): AuthUser,
    State(hub): State<RealtimeHub>,
    Query(query): Query<RealtimeQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = parse_type_filter(query.types.as_deref());
    match &filter {
        Some(types) => tracing::info!("[Realtime] {} subscribed to {:?}", user.username, types),
        None => tracing::info!("[Realtime] {} subscribed to all events", user.username),
    }

    let receiver = hub.subscribe(user.id);

    let stream = stream::unfold((receiver, filter), |(mut rx, filter)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(types) = &filter {
                        if !types.contains(&event.event_type) {
                            continue;
                        }
                    }
                    if let Some(sse_event) = to_sse(&event) {
                        return Some((Ok(sse_event), (rx, filter)));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Receiver lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[Realtime] Channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
