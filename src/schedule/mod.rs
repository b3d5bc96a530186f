pub mod types;
pub mod slot_utils;
pub mod matrix;
pub mod assignment;
pub mod reducer;


pub use types::{ApplicantId, DateLabel, ScheduleData, SlotKey, SlotLabel, TimeRange};
pub use assignment::{DragPayload, DragSource, DropTarget};
pub use reducer::{reduce, ScheduleAction};
pub use slot_utils::{
    calculate_time_range, minutes_to_time_string, next_start_time, parse_time_to_minutes,
    time_options, DEFAULT_DURATION_MINUTES, DURATION_OPTIONS, MINUTES_PER_DAY,
};
