pub mod book;
pub mod calendar;
pub mod filter;
pub mod gesture;
pub mod layout;
pub mod planner;
pub mod task;

pub use book::TaskBook;
pub use filter::{Filters, Horizon};
pub use gesture::GestureOutcome;
pub use planner::Planner;
pub use task::{Category, Task};
