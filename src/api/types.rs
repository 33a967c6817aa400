//! Shared state for the API layer.

use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::llm::LlmClient;

/// Shared context for all API routes: the database handle, the LLM client,
/// and the resolved runtime configuration. Built once at composition time.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Database>,
    pub llm: Arc<dyn LlmClient>,
    pub config: Arc<Config>,
}

impl ApiContext {
    pub fn new(db: Arc<Database>, llm: Arc<dyn LlmClient>, config: Arc<Config>) -> Self {
        Self { db, llm, config }
    }
}
