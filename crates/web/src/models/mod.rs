//! Domain models for the directory.
//!
//! These types represent validated domain objects separate from database
//! row types (row structs live next to their queries in [`crate::db`]).

pub mod review;
pub mod session;
pub mod store;
pub mod user;

pub use review::{Review, ReviewInput};
pub use session::{CurrentUser, keys as session_keys};
pub use store::{Location, NearbyStore, SearchHit, Store, StoreDetail, StoreInput, TagCount, TopStore};
pub use user::User;
