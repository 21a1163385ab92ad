// Staged mutation lifecycle: request -> begin -> validate -> completion/failure.
// Every stage carries a one-shot resolution record; transitions consume the
// stage value and require the predecessor to have resolved successfully.

pub mod begin;
pub mod executor;
pub mod operation;
pub mod outcome;
pub mod request;
pub mod resolution;
pub mod validate;

// Re-export core types
pub use begin::*;
pub use executor::*;
pub use operation::*;
pub use outcome::*;
pub use request::*;
pub use resolution::*;
pub use validate::*;
