//! Render keyword detection.
//!
//! A reply triggers a render when it contains the stem of any keyword, i.e.
//! the keyword with its trailing `:` removed, compared case-insensitively.

use asai_core::config::schema::DEFAULT_RENDER_KEYWORDS;

/// A compiled set of render keywords.
#[derive(Clone, Debug)]
pub struct RenderTriggers {
    stems: Vec<String>,
}

impl RenderTriggers {
    /// Build from any list of keywords. Blank keywords are ignored.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stems = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().trim_end_matches(':').trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { stems }
    }

    /// Whether `text` mentions any keyword.
    pub fn matches(&self, text: &str) -> bool {
        self.matched(text).is_some()
    }

    /// The first stem found in `text`, if any.
    pub fn matched(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.stems
            .iter()
            .find(|stem| haystack.contains(stem.as_str()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }
}

impl Default for RenderTriggers {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_KEYWORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_with_colon() {
        let triggers = RenderTriggers::default();
        assert!(triggers.matches("Concepto: un salón nórdico"));
        assert!(triggers.matches("Here is my PROPOSAL: warm oak"));
    }

    #[test]
    fn test_stem_without_colon() {
        let triggers = RenderTriggers::default();
        assert!(triggers.matches("no hay propuesta aqui"));
        assert_eq!(triggers.matched("no hay propuesta aqui"), Some("propuesta"));
    }

    #[test]
    fn test_non_ascii_case_folding() {
        let triggers = RenderTriggers::default();
        assert!(triggers.matches("DISEÑO: minimalista"));
        assert!(triggers.matches("Distribución abierta"));
    }

    #[test]
    fn test_no_match() {
        let triggers = RenderTriggers::default();
        assert!(!triggers.matches("Hola, ¿en qué puedo ayudarte?"));
        assert!(!triggers.matches(""));
    }

    #[test]
    fn test_custom_keywords() {
        let triggers = RenderTriggers::new(["Moodboard:", "  ", ":"]);
        assert!(!triggers.is_empty());
        assert!(triggers.matches("my moodboard for you"));
        assert!(!triggers.matches("Concept: loft"));
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let triggers = RenderTriggers::new(Vec::<String>::new());
        assert!(triggers.is_empty());
        assert!(!triggers.matches("anything"));
    }
}
