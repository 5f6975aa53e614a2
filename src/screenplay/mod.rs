//! Actors, the abilities they hold, and the questions they can ask.
//!
//! An [`Actor`] owns at most one instance of each [`Ability`] type. Questions
//! look abilities up through [`Actor::using`], which fails with
//! [`AbilityMissing`] when the actor was never granted one.

mod actor;
mod question;

pub use actor::{Ability, AbilityMissing, Actor};
pub use question::Question;
