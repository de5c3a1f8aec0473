use serde::Deserialize;

/// One practice question as it appears in the JSON artifact. Field names follow
/// the artifact's camelCase keys. Everything past `title` is optional: the
/// extraction that produced the artifact could not always recover a body,
/// choices, or an answer for every entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub question_number: u32,
    pub section: String,
    pub module: String,
    pub title: String,
    pub difficulty: Option<String>,
    pub points: Option<u32>,
    pub question_text: Option<String>,
    pub choices: Option<Vec<String>>,
    pub answer: Option<String>,
    pub explanation: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Question {
    /// Rank used for the difficulty sort. The artifact labels difficulties in
    /// Korean (하급/중급/상급); the English equivalents rank the same. Anything
    /// unrecognized (including a missing difficulty) ranks 0 and sorts first.
    pub fn difficulty_rank(&self) -> u8 {
        match self.difficulty.as_deref() {
            Some("하급") | Some("low") => 1,
            Some("중급") | Some("medium") => 2,
            Some("상급") | Some("high") => 3,
            _ => 0,
        }
    }

    pub fn points_or_zero(&self) -> u32 {
        self.points.unwrap_or(0)
    }

    /// Case-insensitive substring containment against every searchable field.
    /// `query` must already be lowercased.
    pub fn matches(&self, query: &str) -> bool {
        let contains = |s: &str| s.to_lowercase().contains(query);
        contains(&self.title)
            || self.question_text.as_deref().is_some_and(contains)
            || self
                .choices
                .as_deref()
                .is_some_and(|cs| cs.iter().any(|c| contains(c)))
            || self.keywords.iter().any(|k| contains(k))
            || contains(&self.section)
            || self.explanation.as_deref().is_some_and(contains)
    }
}
