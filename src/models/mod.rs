pub mod alert;
pub mod instrument;
pub mod log_entry;
pub mod portfolio;
pub mod position;
pub mod quote;

pub use alert::Alert;
pub use instrument::Instrument;
pub use log_entry::LogEntry;
pub use portfolio::Portfolio;
pub use position::Position;
pub use quote::Quote;
