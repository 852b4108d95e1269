//! Server-Sent Events stream of run lifecycle events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::{AppState, Backend};

/// `GET /api/runs/stream` — one `data:` frame per run event.
///
/// Snapshot saves travel on the same bus but are not forwarded. Each frame
/// is named after the event type so clients can listen selectively.
pub async fn stream<B: Backend>(
    State(state): State<AppState<B>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let events = BroadcastStream::new(state.event_bus.subscribe()).filter_map(|result| match result {
        Ok(event) if event.event_type.is_run_event() => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default()
                .event(event.event_type.to_string())
                .data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to encode run event");
                None
            }
        },
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "run stream subscriber lagged");
            None
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tokio_stream::StreamExt;
    use tower::ServiceExt;

    use inksync_app::ports::EventPublisher;
    use inksync_domain::event::Event as DomainEvent;
    use inksync_domain::id::{AutomationId, RunId};

    use crate::test_support::Harness;

    #[tokio::test]
    async fn should_stream_run_events_only() {
        let h = Harness::new();
        let response = h
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/runs/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "text/event-stream"
        );

        let bus = &h.state.event_bus;
        bus.publish(DomainEvent::automations_saved(1)).await.unwrap();
        bus.publish(DomainEvent::run_started(
            AutomationId::new(),
            RunId::new(),
            "key_press",
        ))
        .await
        .unwrap();

        let mut body = response.into_body().into_data_stream();
        let frame = body.next().await.unwrap().unwrap();
        let frame = String::from_utf8(frame.to_vec()).unwrap();
        assert!(frame.starts_with("event: run_started\n"), "{frame}");
        assert!(frame.contains("\"event_type\":\"run_started\""), "{frame}");
    }
}
