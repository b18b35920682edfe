//! Command implementations.

pub mod analyze;
pub mod check;
pub mod history;
pub mod init;
pub mod stats;

pub use self::analyze::execute_analyze;
pub use self::check::execute_check;
pub use self::history::{execute_history, execute_report, execute_show};
pub use self::init::execute_init;
pub use self::stats::{execute_clear, execute_stats};
