//! Trait definitions for the Cascade library.
//!
//! A cascade talks to every provider through [`ChatDriver`]; the orchestrator
//! obtains one driver per provider from a [`DriverFactory`].

mod traits;

pub use traits::{ChatDriver, DriverFactory};
