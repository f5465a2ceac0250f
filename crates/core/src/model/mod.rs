mod fish;
mod session;

pub use fish::{FishError, FishName, FishRecord, names_match, parse_count};
pub use session::{BAIT_TYPES, Session, UNSPECIFIED, WATER_TYPES, normalize_type};
