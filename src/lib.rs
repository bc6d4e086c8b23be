//! Traffic Forecaster
//!
//! Hourly traffic-volume analytics and iterative multi-step forecasting over
//! the Metro Interstate (I-94) dataset, served over HTTP.

pub mod analytics;
pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod forecast;
pub mod ml;
pub mod repo;
pub mod telemetry;
