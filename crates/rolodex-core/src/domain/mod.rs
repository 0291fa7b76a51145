pub mod phone;
pub mod record;

pub use phone::normalize_phone;
pub use record::{Field, Record};
