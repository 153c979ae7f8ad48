pub mod completion;
pub mod config;
pub mod driver;
pub mod error;
pub mod judge;
pub mod pipeline;
pub mod profiles;
pub mod retry;
pub mod scheduler;
pub mod tracker;
