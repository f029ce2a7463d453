use crate::error::AppError;
use model::history::{HistoryEntry, HistoryLedgerRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct GetLedger {
    ledger_repository: Arc<dyn HistoryLedgerRepository>,
}

impl GetLedger {
    pub fn new(ledger_repository: Arc<dyn HistoryLedgerRepository>) -> Self {
        Self { ledger_repository }
    }

    /// The full play history, most-recent-first.
    pub async fn handle(&self) -> Result<Vec<HistoryEntry>, AppError> {
        Ok(self.ledger_repository.list().await?)
    }
}
