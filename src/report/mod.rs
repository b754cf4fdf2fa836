//! Narrative reports, lesson notes and advisory text.

pub mod advisory;
pub mod notes;
pub mod synthesizer;

pub use advisory::{Advisor, NO_RESPONSE, NO_SUMMARY};
pub use notes::{
    homework_prompt, parse_homework, Homework, LessonNotes, NotesContent, NotesSource, NotesWriter,
};
pub use synthesizer::{report_date, report_prompt, wrap_report, ReportSynthesizer};
