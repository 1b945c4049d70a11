//! Configuration types module

pub mod app;
pub mod http;
pub mod logging;
pub mod polling;
pub mod process;
pub mod resilience;

pub use app::HarnessConfig;
pub use http::HttpConfig;
pub use logging::LoggingConfig;
pub use polling::PollingConfig;
pub use process::ProcessConfig;
pub use resilience::ResilienceConfig;
