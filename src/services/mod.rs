// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod ingestion_service;
pub mod task_registry;
pub mod write_coordinator;


pub use ingestion_service::{IngestionReport, IngestionService};
pub use task_registry::TaskRegistry;
pub use write_coordinator::{WriteContext, WriteCoordinator};
