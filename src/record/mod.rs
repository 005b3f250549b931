//! Raw record parsing, text normalization, and adaptation into
//! canonical located records.

pub mod adapter;
pub mod normalize;
pub mod raw;

pub use adapter::{LocatedRecord, RecordAdapter, UserProfile};
pub use normalize::normalize_location;
pub use raw::{RawCoordinate, RawPlace, RawStatus, RawUser};
