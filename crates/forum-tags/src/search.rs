//! Search submissions carried in a query string (`q=text&t=<id>&t=<id>`).

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::TagError;
use crate::record::TagId;

/// What the search dialog submits: free text plus the reduced tag selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSubmission {
    pub query: String,
    pub tag_ids: Vec<TagId>,
}

impl SearchSubmission {
    /// Encode as a form-urlencoded query string.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("q", &self.query);
        for id in &self.tag_ids {
            serializer.append_pair("t", &id.to_string());
        }
        serializer.finish()
    }

    /// Parse a query string (without the leading `?`). Unknown keys are ignored.
    pub fn from_query_string(input: &str) -> Result<Self, TagError> {
        let mut submission = Self::default();
        for (key, value) in form_urlencoded::parse(input.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "q" => submission.query = value.into_owned(),
                "t" => {
                    let id = TagId::parse_str(&value)
                        .map_err(|_| TagError::InvalidTagId(value.into_owned()))?;
                    submission.tag_ids.push(id);
                }
                _ => {}
            }
        }
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_and_repeated_tags() {
        let a = TagId::parse_str("6f1c0e0a-8a43-4b0e-9f59-1f0b0f3c1a01").unwrap();
        let b = TagId::parse_str("0a5d8c5e-2c6f-4f5c-8d0e-9e7b3a6d2b02").unwrap();
        let submission = SearchSubmission {
            query: "rust & c++".into(),
            tag_ids: vec![a, b],
        };
        assert_eq!(
            submission.to_query_string(),
            "q=rust+%26+c%2B%2B&t=6f1c0e0a-8a43-4b0e-9f59-1f0b0f3c1a01&t=0a5d8c5e-2c6f-4f5c-8d0e-9e7b3a6d2b02"
        );
        assert_eq!(
            SearchSubmission::from_query_string(&submission.to_query_string()).unwrap(),
            submission
        );
    }

    #[test]
    fn leading_question_mark_and_unknown_keys() {
        let parsed = SearchSubmission::from_query_string("?page=2&q=web").unwrap();
        assert_eq!(parsed.query, "web");
        assert!(parsed.tag_ids.is_empty());
    }

    #[test]
    fn malformed_tag_id_rejected() {
        assert_eq!(
            SearchSubmission::from_query_string("t=not-a-uuid"),
            Err(TagError::InvalidTagId("not-a-uuid".into()))
        );
    }
}
