// Application layer - use cases and orchestration over the domain types.
// Remote API and device storage are reached through the traits in `ports`.

pub mod error;
pub mod ports;
pub mod queue;
pub mod service;

pub use error::*;
pub use ports::*;
pub use queue::*;
pub use service::*;
