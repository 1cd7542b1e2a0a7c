//! weft-editor-core: priority-ordered dispatch of editing notifications.
//!
//! This crate provides:
//! - `TextProcessing` trait for pluggable editing behaviour
//! - `TextProcessor` - the dispatcher that runs processors around each edit
//! - `EditorSurface` trait for the text view that drives the dispatcher
//! - `PlainEditor` - ropey-backed reference surface

pub mod actions;
pub mod config;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod processor;
pub mod registry;
pub mod surface;
pub mod text;
pub mod types;

pub use actions::{EditedMask, Key, Modifiers, Range};
pub use config::{DispatcherConfig, ReentrancyPolicy};
pub use dispatch::{Dispatch, Phase, TextProcessor};
pub use editor::PlainEditor;
pub use error::{ConfigError, DispatchError, EditorError};
pub use processor::{Priority, ProcessorRef, TextProcessing};
pub use registry::ProcessorRegistry;
pub use smol_str::SmolStr;
pub use surface::{EditorSurface, ExecutionReport};
pub use text::{EditorRope, TextBuffer};
pub use types::{EditEvent, Selection};
