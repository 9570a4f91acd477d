use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TEST_CASE_SYSTEM_PROMPT: &str = "You are a professional test engineer. Generate \
     detailed test cases for the given requirement, including test steps, expected results \
     and a priority for each case.";

pub const TEST_PLAN_SYSTEM_PROMPT: &str = "You are a professional test engineer. Generate a \
     detailed test plan for the given objective. The plan should include: 1. plan name, \
     2. test scope, 3. test strategy, 4. resource requirements, 5. schedule, 6. risk \
     analysis, 7. a concrete implementation section with detailed steps, owners and \
     acceptance criteria. Return the result as Markdown and make sure the implementation \
     details are complete.";

#[derive(Deserialize)]
pub struct GenerateTestCasesRequest {
    pub requirement: String,
}

#[derive(Deserialize)]
pub struct GenerateTestPlansRequest {
    pub objective: String,
}

#[derive(Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Deserialize)]
pub struct AnalyzeTestCasesRequest {
    pub date_range: Option<DateRange>,
    pub priorities: Option<Vec<String>>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct FailurePattern {
    pub id: String,
    pub title: String,
    pub failure_count: i64,
}

#[derive(Debug, FromRow)]
pub struct CasePriorityCount {
    pub priority: String,
    pub cnt: i64,
}

#[derive(Serialize)]
pub struct AnalyzeTestCasesResponse {
    pub total_cases: i64,
    pub priority_distribution: BTreeMap<String, i64>,
    pub failure_patterns: Vec<FailurePattern>,
    pub common_keywords: Vec<String>,
    pub ai_analysis: String,
}

// Top-10 words across titles, short words skipped; ties break
// alphabetically so the digest is stable.
pub fn extract_keywords(titles: &[String]) -> Vec<String> {
    let mut frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for title in titles {
        for word in title.split_whitespace() {
            if word.chars().count() > 3 {
                *frequency.entry(word).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(10)
        .map(|(word, _)| word.to_string())
        .collect()
}

pub fn build_analysis_prompt(
    total_cases: i64,
    priority_distribution: &BTreeMap<String, i64>,
    failure_patterns: &[FailurePattern],
    common_keywords: &[String],
) -> String {
    let distribution: Vec<String> = priority_distribution
        .iter()
        .map(|(priority, count)| format!("{}: {}", priority, count))
        .collect();
    let failures: Vec<String> = failure_patterns
        .iter()
        .map(|pattern| format!("\"{}\" failed {} times", pattern.title, pattern.failure_count))
        .collect();

    format!(
        "You are a professional test analyst. Based on the following test data, provide \
         analysis and recommendations:\n\
         - Total test cases: {}\n\
         - Priority distribution: {}\n\
         - Common failure patterns: {}\n\
         - Keyword analysis: {}\n\n\
         Please provide:\n\
         1. Test coverage analysis\n\
         2. Priority optimization suggestions\n\
         3. A summary of common failure patterns\n\
         4. Suggestions for new test cases",
        total_cases,
        distribution.join(", "),
        failures.join("; "),
        common_keywords.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn short_words_are_skipped() {
        let keywords = extract_keywords(&titles(&["log in and out", "log in again"]));
        assert_eq!(keywords, vec!["again".to_string()]);
    }

    #[test]
    fn ranked_by_frequency_then_alphabetically() {
        let keywords = extract_keywords(&titles(&[
            "login fails with expired password",
            "login succeeds with valid password",
            "checkout fails under load",
        ]));
        assert_eq!(keywords[0], "fails");
        assert_eq!(keywords[1], "login");
        assert_eq!(keywords[2], "password");
        assert!(keywords.contains(&"checkout".to_string()));
    }

    #[test]
    fn caps_at_ten_keywords() {
        let many = titles(&[
            "alpha bravo charlie delta echos foxtrot golfing hotels indigo juliet kilos limas",
        ]);
        assert_eq!(extract_keywords(&many).len(), 10);
    }

    #[test]
    fn empty_titles_produce_no_keywords() {
        assert!(extract_keywords(&[]).is_empty());
    }

    #[test]
    fn analysis_prompt_carries_the_digest() {
        let mut distribution = BTreeMap::new();
        distribution.insert("P1".to_string(), 4i64);
        let patterns = vec![FailurePattern {
            id: "tc-1".into(),
            title: "Login fails".into(),
            failure_count: 3,
        }];
        let prompt = build_analysis_prompt(4, &distribution, &patterns, &["login".to_string()]);
        assert!(prompt.contains("Total test cases: 4"));
        assert!(prompt.contains("P1: 4"));
        assert!(prompt.contains("\"Login fails\" failed 3 times"));
        assert!(prompt.contains("login"));
    }
}
