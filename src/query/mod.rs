pub mod filter;
pub mod period;

pub use filter::{AttendanceQuery, FilterRequest, Projection, QueryBuilder};
pub use period::Period;
