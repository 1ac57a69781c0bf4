//! Artifact generation seam.
//!
//! The backend is an external collaborator. This module fixes the
//! draft-then-polish contract and ships a deterministic offline backend.

mod backend;
mod echo;

pub use backend::{
    generate, polish, Artifact, GenerationBackend, GenerationError, GenerationResult,
    GenerationStatus,
};
pub use echo::EchoBackend;
