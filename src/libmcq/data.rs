use crate::libmcq::Error;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One multiple-choice item as it appears in the input JSON array.
///
/// Absent and `null` fields both read as the empty string through the accessors.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct QuestionRecord {
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(rename = "Question", default)]
    pub question: Option<String>,
    #[serde(default)]
    pub option: Option<String>,
}

impl QuestionRecord {
    pub fn new(image_name: &str, question: &str, option: &str) -> Self {
        Self {
            image_name: Some(image_name.to_string()),
            question: Some(question.to_string()),
            option: Some(option.to_string()),
        }
    }

    pub fn image_name(&self) -> &str {
        self.image_name.as_deref().unwrap_or_default()
    }

    pub fn question(&self) -> &str {
        self.question.as_deref().unwrap_or_default()
    }

    pub fn option(&self) -> &str {
        self.option.as_deref().unwrap_or_default()
    }

    /// Question text followed by the option listing, trimmed.
    pub fn prompt(&self) -> String {
        format!("{}\n{}", self.question(), self.option())
            .trim()
            .to_string()
    }
}

pub fn load_mcq_data(path: &Path) -> Result<Vec<QuestionRecord>, Error> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::ReadData {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<QuestionRecord> =
        serde_json::from_str(json.as_str()).map_err(|source| Error::MalformedJson {
            path: path.to_path_buf(),
            source,
        })?;
    info!("[Load] {} questions from {:?}", records.len(), path);
    Ok(records)
}

/// Reads recorded model output keyed by `image_name`.
pub fn load_responses(path: &Path) -> Result<HashMap<String, String>, Error> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::ReadResponses {
        path: path.to_path_buf(),
        source,
    })?;
    let responses: HashMap<String, String> =
        serde_json::from_str(json.as_str()).map_err(|source| Error::MalformedJson {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("[Load] {} recorded responses from {:?}", responses.len(), path);
    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_and_null_fields_read_as_empty() {
        let records: Vec<QuestionRecord> = serde_json::from_str(
            r#"[{"image_name": "3.png"}, {"image_name": null, "Question": "Q?", "extra": 1}]"#,
        )
        .unwrap();
        assert_eq!(records[0].image_name(), "3.png");
        assert_eq!(records[0].question(), "");
        assert_eq!(records[0].option(), "");
        assert_eq!(records[1].image_name(), "");
        assert_eq!(records[1].question(), "Q?");
    }

    #[test]
    fn field_names_are_case_sensitive() {
        let records: Vec<QuestionRecord> =
            serde_json::from_str(r#"[{"question": "lower", "Question": "upper"}]"#).unwrap();
        assert_eq!(records[0].question(), "upper");
    }

    #[test]
    fn prompt_joins_question_and_options() {
        let record = QuestionRecord::new("0.jpg", "What is shown?", "A. cat\nB. dog");
        assert_eq!(record.prompt(), "What is shown?\nA. cat\nB. dog");
        assert_eq!(QuestionRecord::new("0.jpg", "", "").prompt(), "");
    }

    #[test]
    fn malformed_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not an array").unwrap();
        let err = load_mcq_data(file.path()).unwrap_err();
        assert!(matches!(err, Error::MalformedJson { .. }));
    }

    #[test]
    fn unreadable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_mcq_data(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::ReadData { .. }));
    }
}
