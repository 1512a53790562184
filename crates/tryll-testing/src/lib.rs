//! Testing infrastructure for tryll tests.
//!
//! - `frames`: Fluent builder for inbound frames in the backend's
//!   comma-terminated wire format
//! - `fixtures`: Sample `/config` and `/chunks` payloads

pub mod fixtures;
pub mod frames;

pub use frames::FrameBuilder;
