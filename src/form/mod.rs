pub mod submission;
pub mod export;

pub use submission::{save_submission, validate_submission, ApplicantForm};
pub use export::{export_to_files, write_board_csv, write_roster_csv};
