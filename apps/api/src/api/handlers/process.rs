use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use futures::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::agents::{Coordinator, EventSink, ProgressEvent};
use crate::api::errors::ApiError;
use crate::api::state::AppState;

/// Request body for task processing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Process a task and stream progress as server-sent events
///
/// POST /api/process
///
/// Every SSE `data:` record is one JSON `ProgressEvent`. The stream opens
/// with `connection` and closes after `final` or `error`. The pipeline runs
/// on its own task, so a disconnecting client does not cancel in-flight
/// completion calls.
pub async fn process_task(
    State(state): State<AppState>,
    Json(req): Json<ProcessRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let task = req
        .task
        .filter(|task| !task.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Task is required"))?;
    let api_key = req
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("API key is required"))?;

    let client = state.clients.build(&api_key)?;

    let (mut tx, mut rx) = mpsc::unbounded_channel();
    tx.emit(ProgressEvent::connection());

    tokio::spawn(async move {
        let mut coordinator = Coordinator::from_client(client);
        if let Err(err) = coordinator.process_task(&task, &mut tx).await {
            tracing::debug!(error = %err, "Pipeline ended with an error event");
        }
    });

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            let terminal = event.is_terminal();

            match Event::default().json_data(&event) {
                Ok(sse) => {
                    yield Ok(sse);
                }
                Err(e) => {
                    tracing::error!(error = %e, kind = event.kind(), "Failed to encode progress event");
                }
            }

            if terminal {
                break;
            }
        }
    };

    Ok(Sse::new(stream))
}
