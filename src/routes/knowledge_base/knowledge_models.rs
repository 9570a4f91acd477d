use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize)]
pub struct KnowledgeSearchQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct KnowledgeIdQuery {
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateKnowledgeRequest {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Deserialize)]
pub struct UpdateKnowledgeRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, FromRow)]
pub struct KnowledgeRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub is_public: bool,
    pub created_by_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_name: String,
    pub created_by_email: String,
}

#[derive(Serialize)]
pub struct KnowledgeResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub created_by_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_name: String,
    pub created_by_email: String,
}

impl From<KnowledgeRow> for KnowledgeResponse {
    fn from(row: KnowledgeRow) -> Self {
        let tags = decode_tags(&row.tags);
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            category: row.category,
            tags,
            is_public: row.is_public,
            created_by_id: row.created_by_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by_name: row.created_by_name,
            created_by_email: row.created_by_email,
        }
    }
}

// Tags are stored as a JSON array string; anything unreadable counts as no
// tags rather than a request failure.
pub fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        let tags = vec!["regression".to_string(), "login".to_string()];
        assert_eq!(decode_tags(&encode_tags(&tags)), tags);
    }

    #[test]
    fn malformed_tags_decode_to_empty() {
        assert!(decode_tags("not json").is_empty());
        assert!(decode_tags("").is_empty());
    }

    #[test]
    fn empty_tags_encode_to_empty_array() {
        assert_eq!(encode_tags(&[]), "[]");
    }
}
