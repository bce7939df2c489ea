//! The objects exchanged with the model: role-tagged messages and the
//! append-only transcript of one run. The wire formats of the individual
//! providers are derived from these in `providers::utils`, never the other
//! way around.
pub mod message;
pub mod transcript;
