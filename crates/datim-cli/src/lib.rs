//! CLI library components for the DATIM analytics client.

pub mod logging;
pub mod output;
