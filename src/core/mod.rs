pub mod dates;
pub mod money;
pub mod obligation_manager;
pub mod services;
pub mod time;

pub use obligation_manager::ObligationManager;
pub use time::{Clock, SystemClock};
