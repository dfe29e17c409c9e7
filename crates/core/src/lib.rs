pub mod config;
pub mod record;
pub mod timeparse;

pub use config::Config;
pub use record::*;
pub use timeparse::parse_timestamp;
