//! Domain models for storygen.
//!
//! # Core Concepts
//!
//! The generation pipeline moves through three entity kinds:
//!
//! - [`Feature`]: A high-level requirement item (e.g. a tracker epic),
//!   ingested from the ticket tracker or an uploaded JSON document.
//! - [`Story`]: A user story derived from a feature, with a
//!   role/goal/benefit description, Given/When/Then acceptance criteria,
//!   and Fibonacci-scale [`StoryPoints`].
//! - [`TestCase`]: A manual test derived from a story, with preconditions,
//!   ordered steps, and a single expected-outcome string.
//!
//! All three are wholesale-replaced in the session on each generation call;
//! there is no incremental merge and no history.

mod feature;
mod story;
mod testcase;

pub use feature::*;
pub use story::*;
pub use testcase::*;
