//! Rendering-independent view models for the tarot client.
//!
//! The reading wizard views render from a [`client_core::SessionSnapshot`]
//! and send [`steps::Intent`]s back to the controller. The reference views
//! (history, card library, spread guide) load their data once and then work
//! locally.

pub mod guide;
pub mod history;
pub mod library;
pub mod pagination;
pub mod steps;

pub use guide::SpreadGuide;
pub use history::{HistoryFilter, HistoryView};
pub use library::{CardCategory, CardLibrary};
pub use pagination::{paginate, total_pages, Page};
pub use steps::{dispatch, Intent, StepView};

/// Where a reference view's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Backend,
    BuiltIn,
}

#[cfg(test)]
#[path = "tests/fake_api.rs"]
mod fake_api;
