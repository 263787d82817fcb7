pub mod yahoo;

pub mod cache;
pub mod db_init;
pub mod jobs;

pub mod alerts_service;
pub mod audit_service;
pub mod compare_service;
pub mod export_service;
pub mod market_service;
pub mod metrics;
pub mod portfolio_service;
