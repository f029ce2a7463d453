pub mod get_ledger;
pub mod get_queue;
