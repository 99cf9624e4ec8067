use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use provex_model::Identity;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RegistrarError;
use crate::relay::DiagnosticSink;
use crate::traits::Registrar;

/// Bridge to the automation sidecar that drives the actual third-party
/// signup flow.
///
/// The sidecar is opaque to the pipeline: we POST the identity and the
/// recovery-email fallback, then read a line-delimited JSON stream.
/// Every `{"log": "..."}` line is forwarded to the per-request
/// diagnostic sink as it arrives; the final `{"success": bool}` line
/// carries the registrar's single verdict.
pub struct HttpRegistrar {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct RegistrationRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    password: &'a str,
    recovery_email: &'a str,
}

#[derive(Debug, Deserialize)]
struct RegistrarLine {
    #[serde(default)]
    log: Option<String>,
    #[serde(default)]
    success: Option<bool>,
}

impl HttpRegistrar {
    /// `timeout` bounds the whole sidecar call. The pipeline itself
    /// imposes none, so a stuck sidecar would otherwise hold its
    /// admission permit forever; deployments should configure one.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RegistrarError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| RegistrarError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Registrar for HttpRegistrar {
    async fn register(
        &self,
        identity: &Identity,
        recovery_email: &str,
        diagnostics: &DiagnosticSink,
    ) -> Result<bool, RegistrarError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RegistrationRequest {
                first_name: &identity.first_name,
                last_name: &identity.last_name,
                email: &identity.email,
                password: &identity.password,
                recovery_email,
            })
            .send()
            .await
            .map_err(|err| RegistrarError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistrarError::Protocol(format!(
                "registrar answered {status}"
            )));
        }

        let mut decoder = LineDecoder::default();
        let mut stream = response.bytes_stream();
        let mut verdict = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| RegistrarError::Transport(err.to_string()))?;
            for line in decoder.push(&chunk) {
                if let Some(outcome) = handle_line(&line, diagnostics).await? {
                    verdict = Some(outcome);
                }
            }
        }
        if let Some(line) = decoder.finish()
            && let Some(outcome) = handle_line(&line, diagnostics).await?
        {
            verdict = Some(outcome);
        }

        verdict.ok_or_else(|| {
            RegistrarError::Protocol("registrar stream ended without a verdict".into())
        })
    }
}

async fn handle_line(
    line: &str,
    diagnostics: &DiagnosticSink,
) -> Result<Option<bool>, RegistrarError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let parsed: RegistrarLine = serde_json::from_str(line)
        .map_err(|err| RegistrarError::Protocol(format!("malformed registrar line: {err}")))?;
    if let Some(log) = parsed.log {
        debug!(line = %log, "registrar diagnostic");
        diagnostics.emit(log).await;
    }
    Ok(parsed.success)
}

/// Splits an arbitrary byte stream into newline-terminated strings,
/// carrying partial lines across chunk boundaries.
#[derive(Default)]
struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..line.len() - 1]).into_owned());
        }
        lines
    }

    fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.buf).into_owned())
        }
    }
}
