mod logo;
mod models;
mod sanitize;

pub use logo::{placeholder_logo, LogoResolver};
pub use models::{unique_sorted_by_title, StationRecord};
pub use sanitize::{clean_text, homepage_domain};
