//! Canonical document paths.

/// Collection of session records.
pub const SESSIONS: &str = "lesson_sessions";

/// Collection of lesson-state records, keyed by session id.
pub const LESSON_STATES: &str = "lesson_states";

/// Collection of per-(student, lesson) analysis documents.
pub const ANALYSIS: &str = "lesson_analysis";

/// Collection of per-(student, lesson) reports.
pub const REPORTS: &str = "student_reports";

/// Collection of progress snapshots, keyed by session id.
pub const PROGRESS: &str = "lesson_progress";

/// Collection of lesson notes, keyed by lesson ref.
pub const LESSON_NOTES: &str = "lesson_notes";

pub fn session(session_id: &str) -> String {
    format!("{}/{}", SESSIONS, session_id)
}

pub fn lesson_state(session_id: &str) -> String {
    format!("{}/{}", LESSON_STATES, session_id)
}

pub fn analysis(student_id: &str, lesson_ref: &str) -> String {
    format!("{}/{}", ANALYSIS, pair_id(student_id, lesson_ref))
}

pub fn report(student_id: &str, lesson_ref: &str) -> String {
    format!("{}/{}", REPORTS, pair_id(student_id, lesson_ref))
}

pub fn progress(session_id: &str) -> String {
    format!("{}/{}", PROGRESS, session_id)
}

pub fn lesson_notes(lesson_ref: &str) -> String {
    format!("{}/{}", LESSON_NOTES, lesson_ref)
}

/// Document id for a (student, lesson) pair.
pub fn pair_id(student_id: &str, lesson_ref: &str) -> String {
    format!("{}_{}", student_id, lesson_ref)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(session("session_1"), "lesson_sessions/session_1");
        assert_eq!(lesson_state("session_1"), "lesson_states/session_1");
        assert_eq!(analysis("stu", "SCI-1"), "lesson_analysis/stu_SCI-1");
        assert_eq!(report("stu", "SCI-1"), "student_reports/stu_SCI-1");
        assert_eq!(progress("session_1"), "lesson_progress/session_1");
        assert_eq!(lesson_notes("SCI-1"), "lesson_notes/SCI-1");
    }
}
