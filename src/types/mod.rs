//! Core type definitions using newtype patterns for type safety.
//!
//! A validated `PortRange` or `TargetAddress` can only be built through its
//! checking constructor, so the scanner never sees an out-of-range bound or
//! an empty host.

mod port;
mod target;

pub use port::{Port, PortError, PortRange};
pub use target::{TargetAddress, TargetError};
