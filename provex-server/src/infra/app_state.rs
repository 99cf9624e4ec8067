use std::fmt;
use std::sync::Arc;

use provex_core::{AdmissionController, Provisioner, TokenHasher, traits::AccountStore};

use crate::infra::config::Config;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub provisioner: Arc<Provisioner>,
    pub admission: AdmissionController,
    pub store: Arc<dyn AccountStore>,
    pub tokens: Arc<TokenHasher>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        provisioner: Arc<Provisioner>,
        admission: AdmissionController,
        store: Arc<dyn AccountStore>,
        tokens: Arc<TokenHasher>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            provisioner,
            admission,
            store,
            tokens,
            config,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("admission", &self.admission)
            .finish_non_exhaustive()
    }
}
