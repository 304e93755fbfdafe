pub mod history;
pub mod projector;
pub mod toggle;

pub use history::{mark_day, normalize_history, reset_subject_history};
pub use projector::compute_goal_satisfaction;
pub use toggle::toggle_date;
