//! The wizard core: step machine, validation gates, and the controller.

pub mod controller;
pub mod step;
pub mod validate;

pub use controller::{Advance, WizardController};
pub use step::Step;
pub use validate::{FieldErrors, validate};
