//! File actions module.
//!
//! This module provides:
//! - [`DeletionCoordinator`]: keeps one survivor per duplicate class and
//!   removes the other copies, asking first unless told otherwise
//! - [`Prompt`]: the source of yes/all/no answers, with a terminal
//!   implementation ([`StdinPrompt`]) and a scripted one ([`ScriptedPrompt`])

pub mod delete;
pub mod prompt;

pub use delete::{DeleteError, DeletionCoordinator, DeletionMode, DeletionReport, Response};
pub use prompt::{Prompt, ScriptedPrompt, StdinPrompt};
