//! Host-facing submodule metadata (data) and the plugin contract (behavior).
//!
//! `descriptor` exposes the static capability descriptor a user-id orchestrator reads to
//! route config, negotiate vendor consent, and tag extended ids. `plugin` defines
//! [`IdProviderPlugin`], the trait the host composes its submodules through at startup.

pub mod descriptor;
pub mod plugin;

pub use descriptor::*;
pub use plugin::*;
