//! Profile setup: the multi-step dialogue that collects a user's body
//! measurements and city, and the completed `Profile` it produces.

pub mod model;
pub mod session;

pub use model::Profile;
pub use session::{ProfilePhase, ProfileSession, ProfileStep};
