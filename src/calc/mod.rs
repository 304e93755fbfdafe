pub mod gpa;

pub use gpa::{cgpa, percentage, sgpa, Weighted};
