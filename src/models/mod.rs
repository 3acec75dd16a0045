//! Record kinds managed by the console.
//!
//! # Core Concepts
//!
//! - [`Instance`]: a live record of some [`Kind`]. Carries an immutable id, a
//!   creation timestamp, an update timestamp, and a field mapping seeded with the
//!   kind's defaults. This is what the store holds and what gets persisted.
//! - [`Kind`]: the record type. Its name is the `__class__` discriminator in the
//!   backing file and the prefix of every composite key.
//! - [`User`], [`Place`], ...: one struct per kind whose `Default` value declares
//!   the kind's fields and their defaults. [`KINDS`] ties each to its name.
//!
//! None of the `*_id` reference fields are validated; they are plain strings.

mod amenity;
mod base_model;
mod city;
mod instance;
mod kind;
mod place;
mod review;
mod state;
mod timestamp;
mod user;

pub use amenity::*;
pub use base_model::*;
pub use city::*;
pub use instance::*;
pub use kind::*;
pub use place::*;
pub use review::*;
pub use state::*;
pub use timestamp::*;
pub use user::*;
