//! HTTP handlers

pub mod health;
pub mod scan;
pub mod report;
pub mod model;
