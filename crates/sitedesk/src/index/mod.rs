//! Site index actions, pure mutators and invariant checks.

pub mod action;
pub mod invariants;
pub mod mutate;
pub mod slug;

pub use action::{PositionSpecifier, SiteIndexAction};
pub use invariants::{assert_index, index_violations};
pub use mutate::{IndexChange, Removal, Upsert, apply, remove_page_by_slug, upsert_page_ref};
pub use slug::{slug_key, validate_slug};
