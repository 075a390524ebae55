pub mod clock;
pub mod error;
pub mod response;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AppError, AppResult};
