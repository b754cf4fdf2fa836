//! Immutable pedagogical catalog: interactive tools, vocabulary bands and
//! taxonomy verbs.
//!
//! Loaded once with the configuration and shared as `Arc<Catalog>` by the
//! content enhancer, the vocabulary validator and the heuristic classifier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::TaxonomyLevel;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(key, items)| (key.to_string(), strings(items)))
        .collect()
}

/// Verb lists used by the heuristic classifier, one per taxonomy level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyVerbs {
    pub remembering: Vec<String>,
    pub understanding: Vec<String>,
    pub applying: Vec<String>,
    pub analyzing: Vec<String>,
    pub evaluating: Vec<String>,
    pub creating: Vec<String>,
}

impl TaxonomyVerbs {
    /// Verbs for a level. `Unknown` has none.
    pub fn for_level(&self, level: TaxonomyLevel) -> &[String] {
        match level {
            TaxonomyLevel::Remembering => &self.remembering,
            TaxonomyLevel::Understanding => &self.understanding,
            TaxonomyLevel::Applying => &self.applying,
            TaxonomyLevel::Analyzing => &self.analyzing,
            TaxonomyLevel::Evaluating => &self.evaluating,
            TaxonomyLevel::Creating => &self.creating,
            TaxonomyLevel::Unknown => &[],
        }
    }
}

impl Default for TaxonomyVerbs {
    fn default() -> Self {
        Self {
            remembering: strings(&[
                "define", "list", "recall", "name", "identify", "memorize", "repeat", "state",
            ]),
            understanding: strings(&[
                "explain",
                "describe",
                "summarize",
                "interpret",
                "classify",
                "discuss",
                "paraphrase",
            ]),
            applying: strings(&[
                "apply",
                "use",
                "solve",
                "demonstrate",
                "calculate",
                "implement",
                "execute",
            ]),
            analyzing: strings(&[
                "analyze",
                "analyse",
                "compare",
                "contrast",
                "examine",
                "differentiate",
                "organize",
            ]),
            evaluating: strings(&[
                "evaluate", "judge", "justify", "critique", "assess", "argue", "defend",
            ]),
            creating: strings(&[
                "create",
                "design",
                "compose",
                "construct",
                "invent",
                "formulate",
                "plan",
            ]),
        }
    }
}

/// Pedagogical catalog shared by the content and classification components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Interactive tools per subject name.
    pub subject_tools: BTreeMap<String, Vec<String>>,
    /// Tools used when a subject has no catalog entry.
    pub generic_tools: Vec<String>,
    /// Required verbs per grade or year band.
    pub vocabulary: BTreeMap<String, Vec<String>>,
    pub taxonomy_verbs: TaxonomyVerbs,
}

impl Catalog {
    /// Tools for a subject, falling back to the generic set.
    pub fn tools_for(&self, subject: &str) -> &[String] {
        match self.subject_tools.get(subject) {
            Some(tools) if !tools.is_empty() => tools,
            _ => &self.generic_tools,
        }
    }

    /// Whether the subject has its own tool set.
    pub fn has_subject(&self, subject: &str) -> bool {
        self.subject_tools
            .get(subject)
            .map(|tools| !tools.is_empty())
            .unwrap_or(false)
    }

    /// Required verbs for a grade band. Unknown bands require nothing.
    pub fn required_verbs(&self, grade: &str) -> &[String] {
        self.vocabulary.get(grade).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let subject_tools = table(&[
            (
                "Mathematics",
                &["geometry puzzle builder", "interactive equation solver", "fraction visualizer"],
            ),
            (
                "English Language",
                &["sentence structure simulator", "vocabulary matching game", "interactive storytelling"],
            ),
            (
                "Science",
                &["virtual lab experiments", "ecosystem simulator", "molecular modeler"],
            ),
            (
                "Artificial Intelligence",
                &["AI ethics scenario simulator", "neural network visualizer", "machine learning sandbox"],
            ),
            (
                "Computing",
                &["code debugging challenges", "algorithm flowchart builder", "cybersecurity scenario trainer"],
            ),
            (
                "Art and Design",
                &["digital color mixer", "perspective grid tool", "art style analyzer"],
            ),
            (
                "Music",
                &["rhythm pattern builder", "instrument sound explorer", "music theory quizzer"],
            ),
            (
                "Arabic Language",
                &["script writing practice", "vocabulary pronunciation coach", "cultural context scenarios"],
            ),
            (
                "French Language",
                &["conjugation puzzle", "immersion scenario builder", "accent trainer"],
            ),
            (
                "Yoruba Language",
                &["proverb matching game", "tone recognition exercises", "cultural storytelling"],
            ),
            (
                "Entrepreneurship",
                &["business plan simulator", "market analysis dashboard", "investment risk calculator"],
            ),
            (
                "Financial Literacy",
                &["budget balancing game", "interest rate visualizer", "stock market simulator"],
            ),
            (
                "Physical and Health Education",
                &["exercise form analyzer", "nutrition planner", "sports strategy builder"],
            ),
            (
                "Islamic Studies",
                &["prayer time calculator", "Quran verse connector", "historical timeline explorer"],
            ),
        ]);

        let vocabulary = table(&[
            ("Year 1", &["identify", "name", "recall"]),
            ("Year 2", &["describe", "sort", "match"]),
            ("Year 3", &["explain", "compare", "classify"]),
            ("Year 4", &["demonstrate", "organize", "predict"]),
            ("Year 5", &["differentiate", "experiment", "hypothesize"]),
            ("Year 6", &["argue", "critique", "reconstruct"]),
            ("Year 7", &["analyze", "model", "engineer"]),
            ("Year 8", &["evaluate", "synthesize", "validate"]),
            ("Year 9", &["design", "optimize", "reimagine"]),
            ("Junior Secondary School 1", &["investigate", "document", "illustrate"]),
            ("Junior Secondary School 2", &["correlate", "systematize", "troubleshoot"]),
            ("Junior Secondary School 3", &["prototype", "quantify", "reconfigure"]),
            ("Primary 1-6", &["recognize", "sequence", "categorize"]),
            ("Nursery", &["observe", "imitate", "respond"]),
        ]);

        Self {
            subject_tools,
            generic_tools: strings(&[
                "virtual whiteboard",
                "interactive quiz",
                "digital flashcards",
                "progress tracker",
                "discussion board",
                "practice exercises",
                "visual aids",
                "collaborative workspace",
            ]),
            vocabulary,
            taxonomy_verbs: TaxonomyVerbs::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = Catalog::default();
        assert_eq!(catalog.subject_tools.len(), 14);
        assert_eq!(catalog.generic_tools.len(), 8);
        assert_eq!(catalog.vocabulary.len(), 14);
    }

    #[test]
    fn test_tools_for_known_subject() {
        let catalog = Catalog::default();
        assert!(catalog.has_subject("Mathematics"));
        assert_eq!(catalog.tools_for("Mathematics")[2], "fraction visualizer");
    }

    #[test]
    fn test_tools_for_unknown_subject_falls_back() {
        let catalog = Catalog::default();
        assert!(!catalog.has_subject("Basket Weaving"));
        assert_eq!(catalog.tools_for("Basket Weaving"), catalog.generic_tools.as_slice());
    }

    #[test]
    fn test_empty_subject_entry_falls_back() {
        let mut catalog = Catalog::default();
        catalog.subject_tools.insert("Drama".to_string(), vec![]);
        assert_eq!(catalog.tools_for("Drama").len(), 8);
    }

    #[test]
    fn test_required_verbs() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.required_verbs("Year 3"),
            &["explain".to_string(), "compare".to_string(), "classify".to_string()]
        );
        assert!(catalog.required_verbs("Year 42").is_empty());
    }

    #[test]
    fn test_verbs_for_unknown_is_empty() {
        let verbs = TaxonomyVerbs::default();
        assert!(verbs.for_level(TaxonomyLevel::Unknown).is_empty());
        assert!(verbs
            .for_level(TaxonomyLevel::Understanding)
            .contains(&"explain".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let catalog: Catalog = toml::from_str(
            r#"
generic_tools = ["chalkboard"]
"#,
        )
        .unwrap();
        assert_eq!(catalog.generic_tools, vec!["chalkboard".to_string()]);
        assert_eq!(catalog.vocabulary.len(), 14);
    }
}
