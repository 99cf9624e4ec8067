//! Shared harness for the HTTP integration tests: an in-process server
//! wired to scripted collaborators and the in-memory store.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use provex_core::{
    AdmissionController, DiagnosticSink, GenerationError, MemoryAccountStore, ProvisionPolicy,
    Provisioner, RegistrarError, TokenHasher,
    traits::{IdentityGenerator, Registrar},
};
use provex_model::{Identity, Requester};
use provex_server::{AppState, Config};
use tokio::sync::{Mutex, Semaphore};
use uuid::Uuid;

pub const TEST_TOKEN: &str = "integration-test-token";
pub const HMAC_KEY: &str = "integration-test-key";

pub fn identity(tag: &str) -> Identity {
    Identity {
        email: format!("{tag}@example.dev"),
        password: format!("pw-{tag}"),
        first_name: "Test".into(),
        last_name: "User".into(),
        domain: "example.dev".into(),
    }
}

/// Generator that hands out pre-scripted identities in order and fails
/// once the script runs dry.
pub struct ScriptedGenerator {
    identities: Mutex<VecDeque<Identity>>,
}

impl ScriptedGenerator {
    pub fn new(identities: Vec<Identity>) -> Self {
        Self {
            identities: Mutex::new(identities.into()),
        }
    }
}

#[async_trait]
impl IdentityGenerator for ScriptedGenerator {
    async fn generate(&self, _domain: &str) -> Result<Identity, GenerationError> {
        self.identities
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| GenerationError("identity script exhausted".into()))
    }
}

/// Registrar with a fixed verdict, optional diagnostic lines, and an
/// optional gate that parks calls until the test releases them.
pub struct ScriptedRegistrar {
    verdict: bool,
    lines: Vec<String>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    entered: tokio::sync::mpsc::UnboundedSender<()>,
}

pub struct RegistrarProbe {
    pub entered: Mutex<tokio::sync::mpsc::UnboundedReceiver<()>>,
}

impl RegistrarProbe {
    pub async fn wait_entered(&self) {
        self.entered.lock().await.recv().await.unwrap();
    }
}

impl ScriptedRegistrar {
    pub fn accepting() -> (Arc<Self>, Arc<RegistrarProbe>) {
        Self::build(true, Vec::new(), None)
    }

    pub fn declining() -> (Arc<Self>, Arc<RegistrarProbe>) {
        Self::build(false, Vec::new(), None)
    }

    pub fn with_lines(lines: Vec<String>) -> (Arc<Self>, Arc<RegistrarProbe>) {
        Self::build(true, lines, None)
    }

    /// Calls block on `gate` after signalling entry; the test adds
    /// permits to let them proceed.
    pub fn gated(gate: Arc<Semaphore>) -> (Arc<Self>, Arc<RegistrarProbe>) {
        Self::build(true, Vec::new(), Some(gate))
    }

    fn build(
        verdict: bool,
        lines: Vec<String>,
        gate: Option<Arc<Semaphore>>,
    ) -> (Arc<Self>, Arc<RegistrarProbe>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let registrar = Arc::new(Self {
            verdict,
            lines,
            calls: AtomicUsize::new(0),
            gate,
            entered: tx,
        });
        let probe = Arc::new(RegistrarProbe {
            entered: Mutex::new(rx),
        });
        (registrar, probe)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registrar for ScriptedRegistrar {
    async fn register(
        &self,
        _identity: &Identity,
        _recovery_email: &str,
        diagnostics: &DiagnosticSink,
    ) -> Result<bool, RegistrarError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.entered.send(());
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| RegistrarError::Transport("gate closed".into()))?;
            permit.forget();
        }
        for line in &self.lines {
            diagnostics.emit(line.clone()).await;
        }
        Ok(self.verdict)
    }
}

pub struct Harness {
    pub server: TestServer,
    pub store: Arc<MemoryAccountStore>,
}

fn test_config(capacity: usize) -> Config {
    Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        database_url: None,
        admission_capacity: capacity,
        account_ttl_days: 15,
        default_recovery_email: "recovery@example.dev".into(),
        registrar_url: "http://127.0.0.1:0/register".into(),
        registrar_timeout_secs: None,
        auth_token_key: HMAC_KEY.into(),
        cors_allowed_origins: Vec::new(),
        dev_mode: true,
    }
}

pub async fn spawn_server(
    capacity: usize,
    generator: Arc<dyn IdentityGenerator>,
    registrar: Arc<dyn Registrar>,
) -> Harness {
    let config = test_config(capacity);
    let store = Arc::new(MemoryAccountStore::new());

    let hasher = TokenHasher::new(config.auth_token_key.as_bytes());
    store
        .seed_requester(
            hasher.hash(TEST_TOKEN),
            Requester {
                id: Uuid::new_v4(),
                domain: "example.dev".into(),
                recovery_email: None,
            },
        )
        .await;

    let policy = ProvisionPolicy {
        ttl_secs: config.ttl_secs(),
        default_recovery_email: config.default_recovery_email.clone(),
    };
    let provisioner = Arc::new(Provisioner::new(
        generator,
        registrar,
        store.clone(),
        policy,
    ));

    let state = AppState::new(
        provisioner,
        AdmissionController::new(capacity),
        store.clone(),
        Arc::new(hasher),
        Arc::new(config),
    );

    let server = TestServer::new(provex_server::routes::build_router(state)).unwrap();
    Harness { server, store }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
