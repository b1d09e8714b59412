//! Deterministic query templates used when the planning service fails
//! or returns unparseable output.
//!
//! These are intentionally dull: fixed phrases per category, seeded with
//! key terms pulled from the goal text. They exist so a run degrades to
//! something searchable rather than stalling on a planner outage.

use forager_shared::{Category, Goal};

/// Words too generic to seed a search query with.
const STOPWORDS: &[&str] = &[
    "find", "collect", "gather", "get", "list", "the", "a", "an", "of", "for", "to", "and", "in",
    "with", "that", "are", "who", "me", "top", "best", "good",
];

/// Meaningful terms from the goal text, in order, deduplicated.
pub(crate) fn key_terms(goal_text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for word in goal_text.split_whitespace() {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if cleaned.len() > 2
            && !STOPWORDS.contains(&cleaned.as_str())
            && !cleaned.chars().all(|c| c.is_ascii_digit())
            && !terms.contains(&cleaned)
        {
            terms.push(cleaned);
        }
    }
    terms
}

/// First usable key term, or the whole goal text as a last resort.
fn primary_term(goal: &Goal) -> String {
    key_terms(&goal.text)
        .into_iter()
        .next()
        .unwrap_or_else(|| goal.text.trim().to_lowercase())
}

/// Initial fallback queries for a goal, by category.
pub fn proposal_queries(goal: &Goal) -> Vec<String> {
    match goal.category {
        Category::Email => vec![
            "recruiter email contacts".into(),
            "HR manager email directory".into(),
            "talent acquisition email list".into(),
        ],
        Category::Website => {
            let term = primary_term(goal);
            vec![
                format!("best {term} websites"),
                format!("top {term} tools online"),
                format!("useful {term} resources"),
            ]
        }
        Category::Job => {
            let term = primary_term(goal);
            vec![
                format!("{term} job openings"),
                format!("{term} careers hiring"),
                format!("{term} positions remote"),
            ]
        }
        Category::General => {
            let term = primary_term(goal);
            vec![
                format!("{term} overview"),
                format!("best {term} resources"),
                format!("{term} examples"),
            ]
        }
    }
}

/// Refinement fallback: one templated query per goal term.
pub fn refinement_queries(goal: &Goal) -> Vec<String> {
    key_terms(&goal.text)
        .into_iter()
        .map(|term| format!("best {term} resources 2024"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_terms_drop_stopwords_and_numbers() {
        let terms = key_terms("Find 10 email addresses of recruiters");
        assert_eq!(terms, vec!["email", "addresses", "recruiters"]);
    }

    #[test]
    fn key_terms_deduplicate() {
        let terms = key_terms("rust rust RUST tooling");
        assert_eq!(terms, vec!["rust", "tooling"]);
    }

    #[test]
    fn email_fallbacks_are_fixed_phrases() {
        let goal = Goal::new("Find 10 email addresses of recruiters");
        let queries = proposal_queries(&goal);
        assert!(queries.contains(&"recruiter email contacts".to_string()));
        assert_eq!(queries.len(), 3);
    }

    #[test]
    fn website_fallbacks_use_goal_terms() {
        let goal = Goal::new("Collect digital marketing websites");
        let queries = proposal_queries(&goal);
        assert!(queries.iter().any(|q| q.contains("digital")));
        assert!(queries.iter().all(|q| !q.contains("collect")));
    }

    #[test]
    fn refinement_generates_one_query_per_term() {
        let goal = Goal::new("machine learning papers");
        let queries = refinement_queries(&goal);
        assert_eq!(
            queries,
            vec![
                "best machine resources 2024",
                "best learning resources 2024",
                "best papers resources 2024",
            ]
        );
    }

    #[test]
    fn fallbacks_are_deterministic() {
        let goal = Goal::new("Find fintech founder contact emails");
        assert_eq!(proposal_queries(&goal), proposal_queries(&goal));
        assert_eq!(refinement_queries(&goal), refinement_queries(&goal));
    }
}
