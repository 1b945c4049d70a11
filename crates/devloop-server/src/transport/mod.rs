//! HTTP transport
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Readiness page with the project coordinates |
//! | `GET /<route>` | String literal compiled for the route |
//! | `POST /call-with-fault-tolerance-on-interface` | Greeting via the guarded client |

pub mod routes;

pub use routes::{
    FixtureState, GreetingState, fixture_rocket, greeting_rocket, rocket_config,
};
