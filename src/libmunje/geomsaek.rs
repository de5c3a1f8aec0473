use crate::libmunje::munje::Question;
use regex::RegexBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Number,
    Difficulty,
    Points,
    Title,
}

impl SortKey {
    pub fn from_str(input: &str) -> Option<SortKey> {
        match input {
            "number" => Some(SortKey::Number),
            "difficulty" => Some(SortKey::Difficulty),
            "points" => Some(SortKey::Points),
            "title" => Some(SortKey::Title),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Number => "number",
            SortKey::Difficulty => "difficulty",
            SortKey::Points => "points",
            SortKey::Title => "title",
        }
    }
}

/// The current filter/sort selections. `None` is the "all" state and
/// contributes no constraint; an empty query likewise.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub query: String,
    pub module: Option<String>,
    pub difficulty: Option<String>,
    pub section: Option<String>,
    pub points: Option<u32>,
    pub sort: SortKey,
}

impl Criteria {
    pub fn is_default(&self) -> bool {
        self.query.trim().is_empty()
            && self.module.is_none()
            && self.difficulty.is_none()
            && self.section.is_none()
            && self.points.is_none()
            && self.sort == SortKey::Number
    }
}

/// Pure derivation of the displayed view: every active filter is an
/// independent predicate, ANDed, then a stable sort by the selected key.
/// A filter value that matches nothing simply yields an empty result.
pub fn filter_and_sort<'a>(questions: &'a [Question], criteria: &Criteria) -> Vec<&'a Question> {
    // a blank query is no constraint, but a non-blank one matches as typed,
    // whitespace included
    let query = if criteria.query.trim().is_empty() {
        String::new()
    } else {
        criteria.query.to_lowercase()
    };
    let mut hits: Vec<&Question> = questions
        .iter()
        .filter(|q| {
            criteria.module.as_deref().is_none_or(|m| q.module == m)
                && criteria
                    .difficulty
                    .as_deref()
                    .is_none_or(|d| q.difficulty.as_deref() == Some(d))
                && criteria.section.as_deref().is_none_or(|s| q.section == s)
                && criteria.points.is_none_or(|p| q.points == Some(p))
                && (query.is_empty() || q.matches(&query))
        })
        .collect();

    // sort_by_key is stable: equal keys keep their artifact order.
    match criteria.sort {
        SortKey::Number => hits.sort_by_key(|q| q.question_number),
        SortKey::Difficulty => hits.sort_by_key(|q| q.difficulty_rank()),
        SortKey::Points => hits.sort_by_key(|q| q.points_or_zero()),
        SortKey::Title => hits.sort_by(|a, b| a.title.cmp(&b.title)),
    }
    hits
}

pub fn total_points(hits: &[&Question]) -> u32 {
    hits.iter().map(|q| q.points_or_zero()).sum()
}

/// Per-difficulty counts over a filtered result, in the given catalog order.
/// Labels with no hits are omitted.
pub fn difficulty_counts(hits: &[&Question], catalog: &[String]) -> Vec<(String, usize)> {
    catalog
        .iter()
        .filter_map(|label| {
            let count = hits
                .iter()
                .filter(|q| q.difficulty.as_deref() == Some(label.as_str()))
                .count();
            (count > 0).then(|| (label.clone(), count))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Match(&'a str),
}

/// Splits `text` into alternating plain and matching segments so a renderer
/// can mark the matches. The query is user-typed free text: regex
/// metacharacters in it are matched literally.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    if query.trim().is_empty() {
        return vec![Segment::Plain(text)];
    }
    let matcher = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .expect("escaped query is a literal pattern");

    let mut segments = Vec::new();
    let mut last = 0;
    for m in matcher.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Plain(&text[last..m.start()]));
        }
        segments.push(Segment::Match(&text[m.start()..m.end()]));
        last = m.end();
    }
    if last < text.len() || segments.is_empty() {
        segments.push(Segment::Plain(&text[last..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: i64,
        number: u32,
        title: &str,
        difficulty: Option<&str>,
        points: Option<u32>,
    ) -> Question {
        Question {
            id,
            question_number: number,
            section: "통합".to_string(),
            module: "설계".to_string(),
            title: title.to_string(),
            difficulty: difficulty.map(String::from),
            points,
            question_text: None,
            choices: None,
            answer: None,
            explanation: None,
            keywords: Vec::new(),
        }
    }

    fn fixture() -> Vec<Question> {
        vec![
            record(1, 2, "가용성 설계", Some("상급"), Some(4)),
            record(2, 1, "나선 모델", Some("하급"), Some(3)),
            record(3, 3, "다중화 구성", None, None),
        ]
    }

    #[test]
    fn default_criteria_return_everything_in_number_order() {
        let questions = fixture();
        let hits = filter_and_sort(&questions, &Criteria::default());
        let numbers: Vec<u32> = hits.iter().map(|q| q.question_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(hits.len(), questions.len());
    }

    #[test]
    fn result_is_a_subset_with_no_duplicates() {
        let questions = fixture();
        let criteria = Criteria {
            difficulty: Some("상급".to_string()),
            ..Criteria::default()
        };
        let hits = filter_and_sort(&questions, &criteria);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
        let mut ids: Vec<i64> = hits.iter().map(|q| q.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), hits.len());
    }

    #[test]
    fn filtering_is_idempotent() {
        let questions = fixture();
        let criteria = Criteria {
            query: "설계".to_string(),
            sort: SortKey::Title,
            ..Criteria::default()
        };
        let first: Vec<i64> = filter_and_sort(&questions, &criteria)
            .iter()
            .map(|q| q.id)
            .collect();
        let second: Vec<i64> = filter_and_sort(&questions, &criteria)
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn difficulty_sort_ranks_low_before_high_and_unknown_first() {
        let questions = fixture();
        let criteria = Criteria {
            sort: SortKey::Difficulty,
            ..Criteria::default()
        };
        let ids: Vec<i64> = filter_and_sort(&questions, &criteria)
            .iter()
            .map(|q| q.id)
            .collect();
        // no difficulty ranks 0, 하급 ranks 1, 상급 ranks 3
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn points_sort_treats_missing_as_zero() {
        let questions = fixture();
        let criteria = Criteria {
            sort: SortKey::Points,
            ..Criteria::default()
        };
        let ids: Vec<i64> = filter_and_sort(&questions, &criteria)
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn equal_sort_keys_keep_artifact_order() {
        let questions = vec![
            record(1, 5, "첫째", Some("중급"), Some(3)),
            record(2, 4, "둘째", Some("중급"), Some(3)),
            record(3, 6, "셋째", Some("중급"), Some(3)),
        ];
        let criteria = Criteria {
            sort: SortKey::Difficulty,
            ..Criteria::default()
        };
        let ids: Vec<i64> = filter_and_sort(&questions, &criteria)
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn query_matches_any_searchable_field_case_insensitively() {
        let mut questions = fixture();
        questions[0].keywords = vec!["Kafka".to_string()];
        questions[1].explanation = Some("kafka 기반 미들웨어".to_string());
        let criteria = Criteria {
            query: "KAFKA".to_string(),
            ..Criteria::default()
        };
        let ids: Vec<i64> = filter_and_sort(&questions, &criteria)
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![2, 1]); // number order: q2 is #1, q1 is #2
    }

    #[test]
    fn filters_combine_with_logical_and() {
        let mut questions = fixture();
        questions[1].module = "핵심".to_string();
        let criteria = Criteria {
            module: Some("설계".to_string()),
            points: Some(4),
            ..Criteria::default()
        };
        let hits = filter_and_sort(&questions, &criteria);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn query_whitespace_is_significant_once_nonblank() {
        let questions = fixture();
        // internal whitespace participates in the match
        let inner = Criteria {
            query: "용성 설".to_string(),
            ..Criteria::default()
        };
        assert_eq!(filter_and_sort(&questions, &inner).len(), 1);
        // leading whitespace is kept: "가용성 설계" has no space before 가용성
        let padded = Criteria {
            query: " 가용성".to_string(),
            ..Criteria::default()
        };
        assert!(filter_and_sort(&questions, &padded).is_empty());
    }

    #[test]
    fn highlight_matches_the_query_as_typed() {
        assert_eq!(
            highlight("가용성 설계", " 설계"),
            vec![Segment::Plain("가용성"), Segment::Match(" 설계")]
        );
    }

    #[test]
    fn unrecognized_filter_value_yields_empty_result() {
        let questions = fixture();
        let criteria = Criteria {
            section: Some("존재하지 않는 섹션".to_string()),
            ..Criteria::default()
        };
        assert!(filter_and_sort(&questions, &criteria).is_empty());
    }

    #[test]
    fn aggregates_cover_the_filtered_result_only() {
        let questions = fixture();
        let criteria = Criteria {
            difficulty: Some("하급".to_string()),
            ..Criteria::default()
        };
        let hits = filter_and_sort(&questions, &criteria);
        assert_eq!(total_points(&hits), 3);
        let catalog = vec!["하급".to_string(), "중급".to_string(), "상급".to_string()];
        assert_eq!(difficulty_counts(&hits, &catalog), vec![("하급".to_string(), 1)]);
    }

    #[test]
    fn highlight_splits_around_case_insensitive_matches() {
        let segments = highlight("Kafka와 kafka 비교", "kafka");
        assert_eq!(
            segments,
            vec![
                Segment::Match("Kafka"),
                Segment::Plain("와 "),
                Segment::Match("kafka"),
                Segment::Plain(" 비교"),
            ]
        );
    }

    #[test]
    fn highlight_treats_metacharacters_literally() {
        let segments = highlight("C++과 C의 차이", "C++");
        assert_eq!(
            segments,
            vec![Segment::Match("C++"), Segment::Plain("과 C의 차이")]
        );
    }

    #[test]
    fn highlight_returns_text_unchanged_for_blank_query() {
        assert_eq!(highlight("그대로", ""), vec![Segment::Plain("그대로")]);
        assert_eq!(highlight("그대로", "   "), vec![Segment::Plain("그대로")]);
    }

    #[test]
    fn highlight_with_no_occurrence_is_one_plain_segment() {
        assert_eq!(
            highlight("아무 일치 없음", "kafka"),
            vec![Segment::Plain("아무 일치 없음")]
        );
    }

    #[test]
    fn sort_key_parses_its_labels() {
        assert_eq!(SortKey::from_str("number"), Some(SortKey::Number));
        assert_eq!(SortKey::from_str("title"), Some(SortKey::Title));
        assert_eq!(SortKey::from_str("score"), None);
    }
}
