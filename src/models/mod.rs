pub mod course;
pub mod marks;
pub mod record;
pub mod report;
pub mod subject;
pub mod todo;

pub use course::{CourseKey, CourseSemesterAttendance};
pub use marks::{MarkedDates, ToggleAction};
pub use record::{AttendanceRecord, AttendanceStatus};
pub use report::{GoalReport, GoalStatus};
pub use subject::{ImportFile, SubjectAttendance};
pub use todo::Todo;
