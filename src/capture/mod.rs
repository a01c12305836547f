//! Capture source: shows one scene's view in the shared off-screen host and snapshots it once.

/// External-command (headless browser) view host.
pub mod command;
/// View host contract and the still-image host.
pub mod host;
/// Readiness policy and one-shot snapshotting.
pub mod source;
