//! Keyword heuristic classifier.
//!
//! Deterministic and I/O free: the text is lower-cased and split into
//! alphabetic tokens, and the first level (in ascending cognitive order)
//! with a verb among the tokens wins.

use std::collections::HashSet;
use std::sync::Arc;

use crate::classify::traits::{Classification, ClassificationSource, TaxonomyClassifier};
use crate::content::Catalog;
use crate::core::TaxonomyLevel;
use crate::error::Result;

/// Classifies by matching taxonomy verbs from the catalog.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    catalog: Arc<Catalog>,
}

impl HeuristicClassifier {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Classify without the `Result` wrapper; this path cannot fail.
    pub fn level_for(&self, text: &str) -> (TaxonomyLevel, Option<String>) {
        let lowered = text.to_lowercase();
        let tokens: HashSet<&str> = lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|t| !t.is_empty())
            .collect();

        for level in TaxonomyLevel::KNOWN {
            let verbs = self.catalog.taxonomy_verbs.for_level(level);
            if let Some(verb) = verbs.iter().find(|verb| matches_verb(&tokens, verb)) {
                return (level, Some(format!("matched verb '{}'", verb)));
            }
        }
        (TaxonomyLevel::Unknown, None)
    }
}

/// Whether any token is `verb` or a regular inflection of it.
fn matches_verb(tokens: &HashSet<&str>, verb: &str) -> bool {
    let verb = verb.to_lowercase();
    inflections(&verb).iter().any(|form| tokens.contains(form.as_str()))
}

fn inflections(verb: &str) -> Vec<String> {
    let mut forms = vec![
        verb.to_string(),
        format!("{}s", verb),
        format!("{}es", verb),
        format!("{}ed", verb),
        format!("{}ing", verb),
    ];
    if let Some(stem) = verb.strip_suffix('e') {
        forms.push(format!("{}d", verb));
        forms.push(format!("{}ing", stem));
    }
    if let Some(stem) = verb.strip_suffix('y') {
        forms.push(format!("{}ies", stem));
        forms.push(format!("{}ied", stem));
    }
    forms
}

impl TaxonomyClassifier for HeuristicClassifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        let (level, rationale) = self.level_for(text);
        Ok(Classification {
            level,
            rationale,
            source: ClassificationSource::Heuristic,
        })
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
