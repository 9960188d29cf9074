//! CV generator input
//!
//! The profile is sent to the backend as JSON. When the backend cannot be
//! reached, [`CvProfile::fallback_artifact`] renders a plain-text CV locally
//! so the user still gets something to download.

use crate::artifact::ResultArtifact;
use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvProfile {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Template name understood by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start: String,
    /// `None` for the current position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub institution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl CvProfile {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let profile: CvProfile = serde_json::from_str(&content)?;
        profile.check()?;
        Ok(profile)
    }

    pub fn check(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(DeskError::InvalidInput("A CV needs a full name".to_string()));
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(DeskError::InvalidInput(format!(
                "'{}' is not an email address",
                self.email
            )));
        }
        Ok(())
    }

    /// Base name for generated files, e.g. `jane-doe-cv`
    pub fn file_stem(&self) -> String {
        let slug = self
            .full_name
            .split_whitespace()
            .map(|part| {
                part.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() {
            "cv".to_string()
        } else {
            format!("{slug}-cv")
        }
    }

    pub fn render_plain_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.full_name);
        if let Some(headline) = &self.headline {
            let _ = writeln!(out, "{headline}");
        }

        let contact: Vec<&str> = [
            Some(self.email.as_str()).filter(|e| !e.is_empty()),
            self.phone.as_deref(),
            self.location.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !contact.is_empty() {
            let _ = writeln!(out, "{}", contact.join(" | "));
        }

        if !self.summary.is_empty() {
            section(&mut out, "Summary");
            let _ = writeln!(out, "{}", self.summary);
        }

        if !self.experience.is_empty() {
            section(&mut out, "Experience");
            for job in &self.experience {
                let end = job.end.as_deref().unwrap_or("present");
                let _ = writeln!(out, "{} - {} ({} to {})", job.title, job.company, job.start, end);
                if !job.description.is_empty() {
                    let _ = writeln!(out, "  {}", job.description);
                }
            }
        }

        if !self.education.is_empty() {
            section(&mut out, "Education");
            for entry in &self.education {
                match &entry.year {
                    Some(year) => {
                        let _ = writeln!(out, "{}, {} ({})", entry.degree, entry.institution, year);
                    }
                    None => {
                        let _ = writeln!(out, "{}, {}", entry.degree, entry.institution);
                    }
                }
            }
        }

        if !self.skills.is_empty() {
            section(&mut out, "Skills");
            let _ = writeln!(out, "{}", self.skills.join(", "));
        }

        out
    }

    /// Locally rendered stand-in for the backend's PDF
    pub fn fallback_artifact(&self) -> ResultArtifact {
        ResultArtifact::new(
            format!("{}.txt", self.file_stem()),
            "text/plain; charset=utf-8",
            self.render_plain_text().into_bytes(),
        )
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}\n{}", title.to_uppercase(), "-".repeat(title.len()));
}
