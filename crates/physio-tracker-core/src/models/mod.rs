//! Domain models for the physio tracker.

mod assessment;
mod dates;
mod patient;
mod progress;
mod rom;

pub use assessment::*;
pub use dates::now;
pub use patient::*;
pub use progress::*;
pub use rom::*;
