pub mod apply;
pub mod inspect;
pub mod validate;

pub use apply::{apply, ApplyArgs};
pub use inspect::{inspect, InspectArgs};
pub use validate::{validate, ValidateArgs};
