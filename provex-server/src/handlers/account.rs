//! Account provisioning endpoints.
//!
//! Both endpoints pass the admission gate before any pipeline work
//! starts; a saturated gate rejects immediately with 429 rather than
//! queueing. The permit is held for the full pipeline run: across the
//! request in blocking mode, and by the background task in streaming
//! mode, so a client that disconnects mid-stream does not free capacity
//! early.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Extension, Json,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use provex_core::relay::DEFAULT_RELAY_CAPACITY;
use provex_core::{ProvisionError, progress_channel};
use provex_model::{ProgressEvent, ProvisionResponse, Requester};
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

/// `GET /account`: run the full pipeline in the request, answer with
/// the final payload only.
pub async fn get_account(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> AppResult<Json<ProvisionResponse>> {
    let _permit = state
        .admission
        .try_acquire()
        .ok_or_else(|| AppError::from(ProvisionError::AdmissionRejected))?;

    debug!(requester = %requester.id, "admitted blocking provisioning request");
    let account = state.provisioner.provision(&requester).await?;

    Ok(Json(ProvisionResponse::success(
        account.to_payload(),
        "account created",
    )))
}

/// `GET /account/stream`: dispatch the pipeline to a background task
/// and relay its progress as server-sent events.
///
/// The admission decision happens before dispatch so a saturated gate
/// still answers with a plain 429 instead of opening a stream. Once
/// admitted, the permit moves into the background task and is released
/// when the pipeline finishes, not when the response is handed off.
pub async fn get_account_stream(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let permit = state
        .admission
        .try_acquire()
        .ok_or_else(|| AppError::from(ProvisionError::AdmissionRejected))?;

    debug!(requester = %requester.id, "admitted streaming provisioning request");
    let (sender, mut receiver) = progress_channel(DEFAULT_RELAY_CAPACITY);

    let provisioner = state.provisioner.clone();
    tokio::spawn(async move {
        let _permit = permit;
        provisioner.provision_streaming(&requester, sender).await;
    });

    let stream = async_stream::stream! {
        // Handshake so the client sees the stream is live before the
        // first pipeline stage reports. Deliberately unlabeled.
        yield Ok(Event::default().data("connection established"));

        // A `None` here means the producer died without sending Close;
        // the dropped sender still terminates the stream.
        while let Some(event) = receiver.recv().await {
            match event {
                ProgressEvent::Log(line) => {
                    yield Ok(Event::default().event("log").data(line));
                }
                ProgressEvent::Done(response) => match serde_json::to_string(&response) {
                    Ok(payload) => yield Ok(Event::default().event("done").data(payload)),
                    Err(err) => warn!(error = %err, "failed to encode terminal done event"),
                },
                ProgressEvent::Error(response) => match serde_json::to_string(&response) {
                    Ok(payload) => yield Ok(Event::default().event("error").data(payload)),
                    Err(err) => warn!(error = %err, "failed to encode terminal error event"),
                },
                // Internal marker only; clients never see it.
                ProgressEvent::Close => break,
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
