//! Lesson content: the pedagogical catalog, normalization, validation,
//! difficulty adaptation and lesson-plan prompts.

pub mod catalog;
pub mod difficulty;
pub mod enhancer;
pub mod plan;
pub mod schema;
pub mod vocabulary;

pub use catalog::{Catalog, TaxonomyVerbs};
pub use difficulty::{
    adjust_difficulty, DifficultyAdjustment, GeneratedSimplifier, StudentHistory, TextSimplifier,
};
pub use enhancer::{ContentEnhancer, MIN_INTERACTIVE_SECTIONS};
pub use plan::{lesson_plan_prompt, LessonPlanner, PlanRequest, TimeAllocation};
pub use schema::{validate_schema, SchemaViolation};
pub use vocabulary::{lesson_text, validate_required_vocabulary};
