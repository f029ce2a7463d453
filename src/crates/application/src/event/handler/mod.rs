pub mod queue_broadcast;
pub mod registry;
