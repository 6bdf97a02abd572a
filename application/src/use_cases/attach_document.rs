//! Attach Document use case
//!
//! Reads a file through the [`DocumentIngestor`] port and adds its text to a
//! session as a session-tier context document.

use crate::ports::document_ingestor::{DocumentIngestor, IngestError};
use crate::use_cases::session_service::{SessionService, SessionServiceError};
use roundtable_domain::{ContextDocument, Message, SessionCommand, SessionId};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const ATTACHED_NOTICE: &str = "A document has been attached and parsed successfully.";
pub const ATTACH_FAILED_NOTICE: &str = "There was an error attaching your document.";

#[derive(Error, Debug)]
pub enum AttachDocumentError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Session(#[from] SessionServiceError),
}

pub struct AttachDocumentUseCase {
    ingestor: Arc<dyn DocumentIngestor>,
    sessions: Arc<SessionService>,
}

impl AttachDocumentUseCase {
    pub fn new(ingestor: Arc<dyn DocumentIngestor>, sessions: Arc<SessionService>) -> Self {
        Self { ingestor, sessions }
    }

    /// Attach `path` to the session; returns the number of bytes added.
    ///
    /// A failed read still leaves a notice in the transcript.
    pub fn execute(
        &self,
        session_id: &SessionId,
        path: &Path,
    ) -> Result<usize, AttachDocumentError> {
        let content = match self.ingestor.ingest(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to attach {}: {}", path.display(), e);
                self.sessions.apply(SessionCommand::Append {
                    session_id: session_id.clone(),
                    message: Message::moderator(ATTACH_FAILED_NOTICE),
                })?;
                return Err(e.into());
            }
        };

        let bytes = content.len();
        self.sessions.apply_all([
            SessionCommand::AddContextDoc {
                session_id: session_id.clone(),
                document: ContextDocument::session(content),
            },
            SessionCommand::Append {
                session_id: session_id.clone(),
                message: Message::moderator(ATTACHED_NOTICE),
            },
        ])?;
        info!("Attached {} ({} bytes)", path.display(), bytes);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::session_storage::InMemorySessionStorage;
    use roundtable_domain::{NoteTier, Roster};

    struct FakeIngestor;

    impl DocumentIngestor for FakeIngestor {
        fn ingest(&self, path: &Path) -> Result<String, IngestError> {
            match path.to_str() {
                Some("notes.md") => Ok("# Notes\nship it".to_string()),
                _ => Err(IngestError::NotFound(path.display().to_string())),
            }
        }
    }

    fn setup() -> (AttachDocumentUseCase, Arc<SessionService>, SessionId) {
        let storage = Arc::new(InMemorySessionStorage::new());
        let sessions = Arc::new(SessionService::open(storage, &Roster::default()).unwrap());
        let id = sessions.require_active().unwrap();
        let use_case = AttachDocumentUseCase::new(Arc::new(FakeIngestor), sessions.clone());
        (use_case, sessions, id)
    }

    #[test]
    fn test_attach_adds_session_tier_document() {
        let (use_case, sessions, id) = setup();

        let bytes = use_case.execute(&id, Path::new("notes.md")).unwrap();

        let session = sessions.session(&id).unwrap();
        assert_eq!(bytes, "# Notes\nship it".len());
        assert_eq!(session.context_docs().len(), 1);
        assert_eq!(session.context_docs()[0].tier, NoteTier::Session);
        assert_eq!(session.messages()[0].content, ATTACHED_NOTICE);
    }

    #[test]
    fn test_attach_failure_leaves_notice_only() {
        let (use_case, sessions, id) = setup();

        let err = use_case.execute(&id, Path::new("missing.pdf")).unwrap_err();

        assert!(matches!(err, AttachDocumentError::Ingest(IngestError::NotFound(_))));
        let session = sessions.session(&id).unwrap();
        assert!(session.context_docs().is_empty());
        assert_eq!(session.messages()[0].content, ATTACH_FAILED_NOTICE);
    }
}
