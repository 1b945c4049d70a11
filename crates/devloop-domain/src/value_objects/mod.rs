//! Domain Value Objects
//!
//! Immutable value objects that describe a dev-mode loop without owning any
//! OS resource.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`ProjectFixture`] | Project tree plus the command that serves it |
//! | [`LaunchSpec`] | Program, arguments, directory and environment to spawn |
//! | [`ReplacementSet`] | Ordered literal replacements for one file |
//! | [`PollRequest`] | Endpoint, matcher and timing of a polling job |
//! | [`PollResult`] | Matched response or timeout with last observation |
//! | [`HarnessState`] | Lifecycle state of a harness |

/// Project fixture value objects
pub mod fixture;
/// HTTP polling value objects
pub mod polling;
/// Source replacement value objects
pub mod replacement;
/// Harness lifecycle state
pub mod state;

pub use fixture::{LaunchSpec, ProjectFixture, ProjectFixtureBuilder};
pub use polling::{
    BodyMatcher, Observation, PollRequest, PollResult, PollTimeout, PolledResponse, join_url,
};
pub use replacement::{Replacement, ReplacementSet};
pub use state::HarnessState;
