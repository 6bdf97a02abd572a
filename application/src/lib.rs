//! Application layer for roundtable
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    document_ingestor::{DocumentIngestor, IngestError},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoRoundProgress, RoundProgressNotifier},
    session_storage::{InMemorySessionStorage, SessionStorage, StorageError},
};
pub use use_cases::attach_document::{AttachDocumentError, AttachDocumentUseCase};
pub use use_cases::run_round::{
    OperatorOutcome, RunRoundError, RunRoundInput, RunRoundUseCase,
};
pub use use_cases::session_service::{BusyGuard, SessionService, SessionServiceError};
