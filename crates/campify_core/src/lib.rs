pub mod derive;
pub mod domain;
pub mod generation;
pub mod policy;
pub mod ports;
pub mod session;

pub use domain::{
    Assignment, Attendance, AttendanceStatus, AuthSession, Course, Grade, NewUser, Payment,
    PaymentStatus, Profile, ReportComment, Role, SharedReport, Timetable, TimetableSlot, User,
    Weekday,
};
pub use generation::{FieldErrors, GenerationKind, GenerationRequest};
pub use policy::Route;
pub use ports::{EntityStore, PortError, PortResult, ReportTextService};
