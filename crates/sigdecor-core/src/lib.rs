//! Signature decoration and cleanup
//!
//! This crate provides the logic that sits between a PDF host SDK and its
//! signing flow:
//!
//! - **Decoration**: [`DecorationRenderer`] draws two curves and two labels
//!   (signer name, timestamp) around signature annotations, as a node tree
//!   the host appends to its page.
//! - **Cleanup**: [`CleanupCoordinator`] listens for created ink/image
//!   annotations and deletes the signature widget and form field the signing
//!   flow leaves behind.
//!
//! The host is abstracted by [`AnnotationHost`]; [`MemoryHost`] is an
//! in-process implementation for tests and simulation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sigdecor_core::{DecorConfig, DecorSession, MemoryHost, SessionOptions, StyleRegistry};
//!
//! # async fn example() -> Result<(), sigdecor_core::ConfigError> {
//! let host = Arc::new(MemoryHost::new());
//! let mut session = DecorSession::start(
//!     host,
//!     DecorConfig::default(),
//!     SessionOptions::default(),
//!     StyleRegistry::global(),
//! )?;
//!
//! while let Some(report) = session.next_report().await {
//!     println!("{:?}", report);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod matching;
pub mod overlay;
pub mod renderer;
pub mod session;
pub mod styles;

pub use config::{DecorConfig, DecorConfigOverrides, SignatureRules};
pub use coordinator::{
    CancelSignal, CleanupCoordinator, CleanupOutcome, CleanupReport, CoordinatorHandle,
    DeletionStatus, DEFAULT_SETTLE_DELAY, REPORT_BUFFER,
};
pub use error::{ConfigError, HostError};
pub use host::{AnnotationHost, DeleteTarget, MemoryHost, Subscription};
pub use matching::{find_cleanup_target, CleanupTarget, MatchStrategy};
pub use overlay::OverlayNode;
pub use renderer::{DecorationRenderer, Overlay};
pub use session::{DecorSession, SessionOptions};
pub use styles::{StyleGuard, StyleRegistry};

pub use sigdecor_types as types;
