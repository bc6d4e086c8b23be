//! Read-only analytics over the historical dataset

pub mod kpi;
pub mod trends;
pub mod weather_impact;

pub use kpi::*;
pub use trends::*;
pub use weather_impact::*;
