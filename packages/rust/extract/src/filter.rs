//! Category-keyed relevance gate for raw search hits.
//!
//! A binary accept/reject applied before any fetch cost is incurred.
//! This is a keyword heuristic, not a ranking.

use forager_shared::{Category, SearchHit};

/// Keywords a hit must mention (in title or snippet) to pass the gate,
/// per category. `None` means the category accepts everything.
fn required_keywords(category: Category) -> Option<&'static [&'static str]> {
    match category {
        Category::Email => Some(&["email", "contact", "recruiter", "hiring"]),
        Category::Website => Some(&["tool", "platform", "service", "website"]),
        Category::Job => Some(&["job", "career", "position", "hiring"]),
        Category::General => None,
    }
}

/// Decide whether a raw hit is worth fetching for this goal category.
///
/// Pure function of the hit's title/snippet text. Matching is
/// case-insensitive; any single keyword suffices.
pub fn is_relevant(hit: &SearchHit, category: Category) -> bool {
    let Some(keywords) = required_keywords(category) else {
        return true;
    };

    let title = hit.title.to_lowercase();
    let snippet = hit.snippet.to_lowercase();

    keywords
        .iter()
        .any(|kw| title.contains(kw) || snippet.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, snippet: &str) -> SearchHit {
        SearchHit {
            title: title.into(),
            url: "https://example.com/page".into(),
            snippet: snippet.into(),
        }
    }

    #[test]
    fn email_category_accepts_recruiter_in_title() {
        let h = hit("Senior Recruiter at Acme", "About the team");
        assert!(is_relevant(&h, Category::Email));
    }

    #[test]
    fn email_category_accepts_keyword_in_snippet_only() {
        let h = hit("Acme people page", "contact our hiring team");
        assert!(is_relevant(&h, Category::Email));
    }

    #[test]
    fn email_category_rejects_without_keywords() {
        let h = hit("Weather forecast", "Sunny with light winds");
        assert!(!is_relevant(&h, Category::Email));
    }

    #[test]
    fn website_category_needs_tool_words() {
        assert!(is_relevant(
            &hit("Best SEO tools", "a platform roundup"),
            Category::Website
        ));
        assert!(!is_relevant(
            &hit("Cooking recipes", "pasta for beginners"),
            Category::Website
        ));
    }

    #[test]
    fn job_category_needs_job_words() {
        assert!(is_relevant(
            &hit("Data Scientist position", "apply today"),
            Category::Job
        ));
        assert!(!is_relevant(
            &hit("City guide", "things to see"),
            Category::Job
        ));
    }

    #[test]
    fn general_category_is_permissive() {
        let h = hit("Anything at all", "no keywords here");
        assert!(is_relevant(&h, Category::General));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let h = hit("RECRUITER DIRECTORY", "");
        assert!(is_relevant(&h, Category::Email));
    }
}
