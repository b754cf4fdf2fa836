//! Lesson-plan prompt construction and generation.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::{LecternError, Result};
use crate::generation::{TextGenerator, SERVICE_NAME};

const DEFAULT_TOPIC: &str = "Untitled Topic";
const DEFAULT_LESSON_LENGTH: &str = "30 min";

/// Who and what a lesson plan is for.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub lesson_ref: String,
    pub student_id: String,
    pub learning_objectives: Vec<String>,
    pub country: String,
    pub curriculum: String,
    pub grade: String,
    pub subject: String,
}

/// Minutes allotted to each phase of a lesson, as display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeAllocation {
    pub intro: String,
    pub key_concepts: String,
    pub guided_practice: String,
    pub assessment: String,
    pub conclusion: String,
}

impl Default for TimeAllocation {
    fn default() -> Self {
        Self {
            intro: "5 min".to_string(),
            key_concepts: "10 min".to_string(),
            guided_practice: "10 min".to_string(),
            assessment: "5 min".to_string(),
            conclusion: "5 min".to_string(),
        }
    }
}

impl TimeAllocation {
    /// Allocation for a stored lesson.
    ///
    /// The introduction's `sectionTimeLength` sets the intro; instructional
    /// steps titled "key concept", "guided practice" or "assessment" set
    /// their phase.
    pub fn from_lesson(lesson: &Value) -> Self {
        let mut allocation = Self::default();

        if let Some(length) = lesson
            .pointer("/introduction/sectionTimeLength")
            .and_then(display_length)
        {
            allocation.intro = length;
        }

        let steps = lesson
            .get("instructionalSteps")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if steps.is_empty() {
            tracing::debug!("lesson has no instructional steps");
        }

        for step in steps {
            let title = step
                .get("sectionTitle")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            let Some(length) = step.get("sectionTimeLength").and_then(display_length) else {
                continue;
            };
            if title.contains("key concept") {
                allocation.key_concepts = length;
            } else if title.contains("guided practice") {
                allocation.guided_practice = length;
            } else if title.contains("assessment") {
                allocation.assessment = length;
            }
        }

        allocation
    }
}

/// Render a length that may be stored as text ("15 min") or minutes (15).
fn display_length(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(minutes) => Some(format!("{} min", minutes)),
        _ => None,
    }
}

fn lesson_str<'a>(lesson: &'a Value, key: &str, default: &'a str) -> &'a str {
    lesson
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
}

/// Taxonomy levels the lesson's metadata asks the assessment to target.
fn target_levels(lesson: &Value) -> Vec<String> {
    let metadata = lesson.get("metadata");
    let levels = metadata
        .and_then(|m| m.get("blooms_level").or_else(|| m.get("BloomsLevel")))
        .map(|v| match v {
            Value::String(level) => vec![level.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        })
        .unwrap_or_default();

    if levels.is_empty() {
        vec!["unspecified".to_string()]
    } else {
        levels
    }
}

/// Build the lesson-plan prompt for `request` over the stored `lesson`.
pub fn lesson_plan_prompt(request: &PlanRequest, lesson: &Value) -> String {
    let topic = lesson_str(lesson, "topic", DEFAULT_TOPIC);
    let length = lesson
        .pointer("/metadata/estimated_duration")
        .and_then(display_length)
        .unwrap_or_else(|| DEFAULT_LESSON_LENGTH.to_string());
    let time = TimeAllocation::from_lesson(lesson);
    let levels = target_levels(lesson).join(", ");
    let student = &request.student_id;
    let grade = &request.grade;
    let country = &request.country;

    format!(
        "You are an AI teacher preparing a one-on-one online lesson plan for student {student} \
         on '{topic}' at {grade} level.\n\n\
         Subject: {subject}\nTopic: {topic}\nGrade Level: {grade}\nCountry: {country}\n\
         Curriculum: {curriculum}\nLesson Reference: {lesson_ref}\nStudent ID: {student}\n\n\
         Learning Objectives:\n- {objectives}\n\n\
         Lesson Duration: {length} (adhere to this duration)\n\n\
         Lesson Structure:\n\
         1. Introduction (approx. {intro}): greet {student}, introduce {topic} and why it matters, \
         open with a surprising fact or real-world scenario.\n\
         2. Key Concepts (approx. {key_concepts}): explain each concept in language suited to {grade}, \
         check understanding with a question per concept, give three examples relevant to {country}.\n\
         3. Guided Practice (approx. {guided_practice}): step-by-step interactive problems with \
         immediate feedback.\n\
         4. Assessment (approx. {assessment}): a 10-question quiz (4 multiple-choice, 3 fill-in-the-gap, \
         3 short answer) aligned with these taxonomy levels: {levels}. Give each answer after its question.\n\
         5. Conclusion (approx. {conclusion}): summarize the objectives, encourage {student}, \
         preview the next topic.\n\n\
         Use graphs, charts, animations, flashcards, drag-and-drop activities and simulations. \
         Do not suggest videos. Generate the complete plan now with specific examples and quiz questions.\n",
        subject = request.subject,
        curriculum = request.curriculum,
        lesson_ref = request.lesson_ref,
        objectives = request.learning_objectives.join(", "),
        intro = time.intro,
        key_concepts = time.key_concepts,
        guided_practice = time.guided_practice,
        assessment = time.assessment,
        conclusion = time.conclusion,
    )
}

/// Generates lesson plans through the text service.
pub struct LessonPlanner {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl LessonPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Generate a plan. Service failures and empty replies are upstream errors.
    pub fn generate(&self, request: &PlanRequest, lesson: &Value) -> Result<String> {
        let plan = self
            .generator
            .generate(&lesson_plan_prompt(request, lesson), self.timeout)?;
        if plan.trim().is_empty() {
            return Err(LecternError::upstream(SERVICE_NAME, "empty lesson plan"));
        }
        tracing::info!(
            lesson_ref = %request.lesson_ref,
            student_id = %request.student_id,
            chars = plan.len(),
            "generated lesson plan"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedGenerator;
    use serde_json::json;

    fn request() -> PlanRequest {
        PlanRequest {
            lesson_ref: "SCI-301".to_string(),
            student_id: "stu-1".to_string(),
            learning_objectives: vec!["explain photosynthesis".to_string()],
            country: "Nigeria".to_string(),
            curriculum: "NERDC".to_string(),
            grade: "Year 3".to_string(),
            subject: "Science".to_string(),
        }
    }

    #[test]
    fn test_default_allocation() {
        assert_eq!(TimeAllocation::from_lesson(&json!({})), TimeAllocation::default());
    }

    #[test]
    fn test_allocation_from_steps() {
        let lesson = json!({
            "introduction": {"sectionTimeLength": "7 min"},
            "instructionalSteps": [
                {"sectionTitle": "Key Concepts", "sectionTimeLength": "12 min"},
                {"sectionTitle": "Guided Practice: leaves", "sectionTimeLength": 8},
                {"sectionTitle": "Final Assessment"},
                {"sectionTitle": "Wrap up", "sectionTimeLength": "3 min"}
            ]
        });
        let time = TimeAllocation::from_lesson(&lesson);
        assert_eq!(time.intro, "7 min");
        assert_eq!(time.key_concepts, "12 min");
        assert_eq!(time.guided_practice, "8 min");
        assert_eq!(time.assessment, "5 min");
        assert_eq!(time.conclusion, "5 min");
    }

    #[test]
    fn test_prompt_contents() {
        let lesson = json!({
            "topic": "Photosynthesis",
            "metadata": {"estimated_duration": 40, "blooms_level": ["understanding", "applying"]}
        });
        let prompt = lesson_plan_prompt(&request(), &lesson);
        assert!(prompt.contains("on 'Photosynthesis' at Year 3 level"));
        assert!(prompt.contains("Lesson Duration: 40 min"));
        assert!(prompt.contains("taxonomy levels: understanding, applying"));
        assert!(prompt.contains("- explain photosynthesis"));
        assert!(prompt.contains("Lesson Reference: SCI-301"));
    }

    #[test]
    fn test_prompt_defaults() {
        let prompt = lesson_plan_prompt(&request(), &json!({}));
        assert!(prompt.contains("Untitled Topic"));
        assert!(prompt.contains("Lesson Duration: 30 min"));
        assert!(prompt.contains("taxonomy levels: unspecified"));
    }

    #[test]
    fn test_generate_surfaces_failures() {
        let planner = LessonPlanner::new(
            Arc::new(ScriptedGenerator::failing("connection refused")),
            Duration::from_secs(30),
        );
        assert!(planner.generate(&request(), &json!({})).is_err());

        let planner = LessonPlanner::new(Arc::new(ScriptedGenerator::always("  ")), Duration::from_secs(30));
        assert!(planner.generate(&request(), &json!({})).is_err());

        let planner = LessonPlanner::new(Arc::new(ScriptedGenerator::always("Plan")), Duration::from_secs(30));
        assert_eq!(planner.generate(&request(), &json!({})).unwrap(), "Plan");
    }
}
