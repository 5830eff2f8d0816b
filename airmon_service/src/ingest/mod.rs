//! Remote data sources.
//!
//! Submodules:
//! - `estaciones` — station API client (one GET per fetch, classified errors).

pub mod estaciones;
