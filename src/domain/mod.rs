//! Domain layer: command intents, credentials, outcomes and regions.
//!
//! These types are transport-agnostic. The HTTP layer builds a
//! [`CommandIntent`] and turns the resolved [`Outcome`] into a response.

pub mod command_intent;
pub mod outcome;
pub mod region;

pub use command_intent::{BearerCredential, CommandIntent, VehicleId};
pub use outcome::Outcome;
pub use region::Region;
