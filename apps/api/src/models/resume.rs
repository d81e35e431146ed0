use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::layout::{parse_experience, parse_lines, parse_list};

/// Everything submitted for one resume. Text fields may be empty; empty fields are skipped
/// by the renderer rather than treated as errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub name: String,
    pub title: String,
    pub profile_text: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// Comma-separated.
    pub skills: String,
    /// Comma-separated.
    pub languages: String,
    /// Comma-separated.
    pub hobbies: String,
    /// Blank-line-delimited blocks, see `layout::blocks::parse_experience`.
    pub experiences: String,
    /// One line per qualification.
    pub education: String,
    /// Raw photo bytes (JPEG/PNG) as uploaded.
    #[serde(skip)]
    pub photo: Option<Bytes>,
}

impl ResumeDocument {
    pub fn experience_entries(&self) -> Vec<ExperienceEntry> {
        parse_experience(&self.experiences)
    }

    pub fn skill_items(&self) -> Vec<String> {
        parse_list(&self.skills)
    }

    pub fn language_items(&self) -> Vec<String> {
        parse_list(&self.languages)
    }

    pub fn hobby_items(&self) -> Vec<String> {
        parse_list(&self.hobbies)
    }

    pub fn education_lines(&self) -> Vec<String> {
        parse_lines(&self.education)
    }

    /// Non-empty contact fields in display order.
    pub fn contact_lines(&self) -> Vec<&str> {
        [&self.phone, &self.email, &self.address]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// One work-experience block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    /// Company and dates; may be empty.
    pub subtitle: String,
    pub bullets: Vec<String>,
}

/// `<sanitizedName>_Resume.<ext>` for the download.
pub fn suggested_filename(name: &str, ext: &str) -> String {
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    let sanitized: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let sanitized = sanitized.trim_matches('_');
    let stem = if sanitized.is_empty() {
        "Untitled"
    } else {
        sanitized
    };
    format!("{stem}_Resume.{ext}")
}
