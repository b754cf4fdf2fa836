//! Session lifecycle: creation, pause/resume, time on task, section
//! progress and lesson lookup.

pub mod lookup;
pub mod manager;

pub use lookup::{find_lesson, FoundLesson};
pub use manager::{InitializedSession, SectionProgress, SessionManager, TimeUpdate};
