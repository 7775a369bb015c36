//! Data shapes exchanged with the language model.
//!
//! Every field of the structured resume has an explicit defaulting policy:
//! absent or `null` strings become empty, absent or `null` lists become empty,
//! and fields the model sometimes returns as either a string or a list are
//! normalized to a list. Anything beyond that is checked by `validate()`.

use serde::{Deserialize, Deserializer, Serialize};

/// At or above this score the model must report no missing keywords.
pub const HIGH_MATCH_THRESHOLD: u32 = 85;

/// Minimum number of bullet points per work-experience entry.
pub const MIN_EXPERIENCE_BULLETS: usize = 5;

/// A response that parsed as JSON but does not satisfy the expected contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SchemaViolation(pub String);

// ────────────────────────────────────────────────────────────────────────────
// Keyword scoring
// ────────────────────────────────────────────────────────────────────────────

/// Result of scoring a resume against a job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub current_score: u32,
    pub expected_score: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub missing_keywords: Vec<String>,
}

impl KeywordAnalysis {
    /// Checks the scoring contract and normalizes the keyword list.
    pub fn validate(mut self) -> Result<Self, SchemaViolation> {
        for (field, score) in [
            ("current_score", self.current_score),
            ("expected_score", self.expected_score),
        ] {
            if score > 100 {
                return Err(SchemaViolation(format!(
                    "{field} must be between 0 and 100, got {score}"
                )));
            }
        }

        self.missing_keywords = self
            .missing_keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if self.current_score >= HIGH_MATCH_THRESHOLD {
            if !self.missing_keywords.is_empty() {
                return Err(SchemaViolation(format!(
                    "current_score {} is a high match but {} missing keywords were reported",
                    self.current_score,
                    self.missing_keywords.len()
                )));
            }
            if self.expected_score != self.current_score {
                return Err(SchemaViolation(format!(
                    "expected_score {} must equal current_score {} for a high match",
                    self.expected_score, self.current_score
                )));
            }
        }

        if self.expected_score < self.current_score {
            return Err(SchemaViolation(format!(
                "expected_score {} is lower than current_score {}",
                self.expected_score, self.current_score
            )));
        }

        Ok(self)
    }
}

/// Parses the free-form `missing_keywords` form value.
/// Accepts a JSON array of strings or a comma / newline separated list.
pub fn parse_missing_keywords(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
    }
    trimmed
        .split([',', '\n'])
        .map(|k| k.trim().trim_matches(|c| matches!(c, '"' | '\'' | '[' | ']')).trim())
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Structured resume
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResume {
    #[serde(rename = "Most_Match_ROLE", default, deserialize_with = "nullable")]
    pub most_match_role: String,
    #[serde(rename = "Personal Information", default, deserialize_with = "nullable")]
    pub personal_information: PersonalInformation,
    #[serde(rename = "Professional Summary", default, deserialize_with = "nullable")]
    pub professional_summary: String,
    #[serde(rename = "Skills", default, deserialize_with = "nullable")]
    pub skills: Vec<String>,
    #[serde(rename = "Work Experience", default, deserialize_with = "nullable")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(rename = "Education", default, deserialize_with = "nullable")]
    pub education: Vec<Education>,
    #[serde(rename = "Certifications", default, deserialize_with = "nullable")]
    pub certifications: Vec<Certification>,
    #[serde(rename = "Projects", default, deserialize_with = "nullable")]
    pub projects: Vec<Project>,
    #[serde(rename = "Other", default, deserialize_with = "nullable")]
    pub other: Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInformation {
    #[serde(rename = "Name", default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "Phone number", default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(rename = "Email", default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(rename = "LinkedIn", default, deserialize_with = "nullable")]
    pub linkedin: String,
    #[serde(rename = "GitHub/portfolio", default, deserialize_with = "nullable")]
    pub portfolio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(rename = "Company", default, deserialize_with = "nullable")]
    pub company: String,
    #[serde(rename = "Title", default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub location: String,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: String,
    #[serde(rename = "Descriptions", default, deserialize_with = "string_or_list")]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(rename = "Institution", default, deserialize_with = "nullable")]
    pub institution: String,
    #[serde(rename = "Degree", default, deserialize_with = "nullable")]
    pub degree: String,
    #[serde(default, deserialize_with = "nullable")]
    pub location: String,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: String,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: String,
}

/// Certifications come back either as bare names or as titled entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Certification {
    Detailed {
        #[serde(rename = "Title")]
        title: String,
        #[serde(rename = "Description", default, deserialize_with = "nullable")]
        description: String,
    },
    Name(String),
}

impl Certification {
    pub fn title(&self) -> &str {
        match self {
            Certification::Detailed { title, .. } => title,
            Certification::Name(name) => name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Certification::Detailed { description, .. } => description,
            Certification::Name(_) => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "Title", default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(rename = "Description", default, deserialize_with = "string_or_list")]
    pub description: Vec<String>,
    #[serde(rename = "Technologies", default, deserialize_with = "nullable")]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Other {
    #[serde(rename = "Strengths", default, deserialize_with = "nullable")]
    pub strengths: Vec<String>,
    #[serde(rename = "Languages", default, deserialize_with = "nullable")]
    pub languages: Vec<String>,
}

impl StructuredResume {
    /// Rejects rewrites that are missing the candidate or thin on experience.
    pub fn validate(self) -> Result<Self, SchemaViolation> {
        if self.personal_information.name.trim().is_empty() {
            return Err(SchemaViolation(
                "Personal Information.Name is missing".to_string(),
            ));
        }

        if let Some(thin) = self
            .work_experience
            .iter()
            .find(|exp| exp.descriptions.len() < MIN_EXPERIENCE_BULLETS)
        {
            return Err(SchemaViolation(format!(
                "work experience at '{}' has {} bullet points, at least {} required",
                thin.company,
                thin.descriptions.len(),
                MIN_EXPERIENCE_BULLETS
            )));
        }

        Ok(self)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Serde helpers
// ────────────────────────────────────────────────────────────────────────────

/// Treats an explicit `null` the same as an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accepts `"a\nb"`, `["a", "b"]` or `null`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(text)) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        None => Vec::new(),
    })
}
