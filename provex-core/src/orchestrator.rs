use std::sync::Arc;

use chrono::Utc;
use provex_model::{Account, ProgressEvent, ProvisionResponse, Requester};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ProvisionError;
use crate::relay::ProgressSender;
use crate::traits::{AccountStore, IdentityGenerator, Registrar};

/// Policy knobs consumed by the orchestrator. Wired from server
/// configuration; defaults match the deployed service.
#[derive(Debug, Clone)]
pub struct ProvisionPolicy {
    /// Account lifetime in seconds; `expire_time = create_time + ttl`.
    pub ttl_secs: i64,
    /// Recovery-email fallback used when the requester has none
    /// configured.
    pub default_recovery_email: String,
}

impl ProvisionPolicy {
    pub const DEFAULT_TTL_SECS: i64 = 15 * 24 * 60 * 60;
}

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Drives the account-creation state machine:
///
/// `GENERATE_IDENTITY -> CHECK_UNIQUENESS -> REGISTER_EXTERNAL ->
/// PERSIST -> DONE`, with failure terminal from any stage and no
/// retries anywhere.
///
/// Both invocation modes share this machine: [`Self::provision`] runs
/// it silently in the caller's task, [`Self::provision_streaming`]
/// runs it with a live [`ProgressSender`] and reports the terminal
/// outcome over the relay.
pub struct Provisioner {
    generator: Arc<dyn IdentityGenerator>,
    registrar: Arc<dyn Registrar>,
    store: Arc<dyn AccountStore>,
    policy: ProvisionPolicy,
    clock: Clock,
}

impl Provisioner {
    pub fn new(
        generator: Arc<dyn IdentityGenerator>,
        registrar: Arc<dyn Registrar>,
        store: Arc<dyn AccountStore>,
        policy: ProvisionPolicy,
    ) -> Self {
        Self::with_clock(
            generator,
            registrar,
            store,
            policy,
            Arc::new(|| Utc::now().timestamp()),
        )
    }

    /// Build with a caller-supplied clock (useful for tests that need
    /// deterministic timestamps).
    pub fn with_clock(
        generator: Arc<dyn IdentityGenerator>,
        registrar: Arc<dyn Registrar>,
        store: Arc<dyn AccountStore>,
        policy: ProvisionPolicy,
        clock: Clock,
    ) -> Self {
        Self {
            generator,
            registrar,
            store,
            policy,
            clock,
        }
    }

    /// Blocking mode: runs the full machine in the caller's task and
    /// returns only the final result.
    pub async fn provision(&self, requester: &Requester) -> Result<Account, ProvisionError> {
        self.run(requester, &ProgressSender::disabled()).await
    }

    /// Streaming mode: runs the machine, emitting a log event before
    /// each stage transition, and terminates the relay with exactly
    /// one `done` or `error` followed by `close`.
    pub async fn provision_streaming(&self, requester: &Requester, progress: ProgressSender) {
        let result = self.run(requester, &progress).await;
        let event = match result {
            Ok(account) => ProgressEvent::Done(ProvisionResponse::success(
                account.to_payload(),
                "account created",
            )),
            Err(err) => ProgressEvent::Error(ProvisionResponse::error(err.to_string())),
        };
        progress.send(event).await;
        // Close is the consumer's termination signal. If this task dies
        // before reaching it, dropping `progress` closes the channel
        // and unblocks the consumer anyway.
        progress.close().await;
    }

    async fn run(
        &self,
        requester: &Requester,
        progress: &ProgressSender,
    ) -> Result<Account, ProvisionError> {
        // GENERATE_IDENTITY: terminal on failure, no retry.
        progress.log("generating account identity").await;
        let identity = self
            .generator
            .generate(&requester.domain)
            .await
            .map_err(|err| ProvisionError::GenerationFailure(err.to_string()))?;

        // CHECK_UNIQUENESS: must short-circuit before the registrar;
        // registration is costly and not reversible.
        progress.log("checking email availability").await;
        let existing = self
            .store
            .find_by_email(&identity.email)
            .await
            .map_err(ProvisionError::from)?;
        if existing.is_some() {
            warn!(email = %identity.email, "generated email already taken");
            progress.log("generated email is already in use").await;
            return Err(ProvisionError::DuplicateIdentity);
        }

        // REGISTER_EXTERNAL: diagnostics are captured through a sink
        // scoped to this request and this stage only.
        let recovery_email = requester
            .recovery_email
            .clone()
            .unwrap_or_else(|| self.policy.default_recovery_email.clone());
        progress.log("registering account with upstream provider").await;
        let diagnostics = progress.diagnostics();
        let registered = self
            .registrar
            .register(&identity, &recovery_email, &diagnostics)
            .await
            .map_err(|err| {
                warn!(error = %err, "registrar call failed");
                ProvisionError::RegistrationFailure
            })?;
        drop(diagnostics);
        if !registered {
            warn!(email = %identity.email, "registrar declined registration");
            return Err(ProvisionError::RegistrationFailure);
        }

        // PERSIST: single transactional insert, nothing partially
        // visible. A late email collision surfaces here as a unique
        // violation instead of corrupting state.
        progress.log("saving account").await;
        let create_time = (self.clock)();
        let account = Account {
            // Emails are globally unique across all rows, so the id is
            // derived from the address and stays stable across replays.
            id: Uuid::new_v5(
                &Uuid::NAMESPACE_URL,
                format!("mailto:{}", identity.email).as_bytes(),
            ),
            email: identity.email,
            password: identity.password,
            first_name: identity.first_name,
            last_name: identity.last_name,
            create_time,
            expire_time: create_time + self.policy.ttl_secs,
            user_id: requester.id,
            is_used: 0,
            is_deleted: 0,
        };
        self.store.insert(&account).await.map_err(ProvisionError::from)?;

        info!(
            account_id = %account.id,
            requester = %requester.id,
            "account provisioned"
        );
        progress.log("account created and saved").await;
        Ok(account)
    }
}
