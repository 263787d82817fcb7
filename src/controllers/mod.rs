pub mod alerts_controller;
pub mod export_controller;
pub mod home_controller;
pub mod logs_controller;
pub mod market_controller;
pub mod portfolio_controller;
