//! Domain model (state, status views, errors).

pub mod errors;
pub mod state;
pub mod status;

pub use self::errors::{SchedulerError, SettleError};
pub use self::state::{SettleState, StateKind};
pub use self::status::CellStatus;
