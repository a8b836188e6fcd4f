mod cohort;
mod collection;
mod item;
mod status;
mod timetable;

pub use cohort::*;
pub use collection::*;
pub use item::*;
pub use status::*;
pub use timetable::*;
