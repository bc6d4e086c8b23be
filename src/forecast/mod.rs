//! Iterative traffic forecasting
//!
//! Weather and lag resolution, feature assembly, the multi-step engine and
//! per-user sessions built on top of it.

pub mod engine;
pub mod features;
pub mod horizon;
pub mod lags;
pub mod manual;
pub mod session;
pub mod weather;

pub use engine::*;
pub use features::*;
pub use horizon::*;
pub use lags::*;
pub use manual::*;
pub use session::*;
pub use weather::*;
