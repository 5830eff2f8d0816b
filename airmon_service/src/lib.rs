//! Station air-quality dashboard.
//!
//! Fetches the current state of an environmental monitoring station from the
//! station API, renders it, and answers natural-language questions about it
//! through a chat-completion assistant grounded on the station data.

pub mod alert;
pub mod analysis;
pub mod assistant;
pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod stations;
