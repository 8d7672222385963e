//! Domain models for the clinic records system.

mod appointment;
mod doctor;
mod lenient;
mod patient;
mod validation;
mod visit;

pub use appointment::*;
pub use doctor::*;
pub use patient::*;
pub use validation::{ValidationError, ValidationResult};
pub use visit::*;
