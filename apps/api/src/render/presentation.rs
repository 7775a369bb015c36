//! Maps a structured resume into the fixed presentation schema the template renders.

use crate::analysis::models::StructuredResume;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeView {
    pub basic_details: BasicDetails,
    pub summary: String,
    pub experience: Vec<ExperienceView>,
    pub education: Vec<EducationView>,
    pub skills: Vec<String>,
    pub certifications: Vec<CertificationView>,
    pub projects: Vec<ProjectView>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicDetails {
    pub name: String,
    pub position: String,
    pub email: String,
    pub linkedin: String,
    /// Not captured by the structured resume; always empty.
    pub location: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperienceView {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    /// Bullets joined by newlines; the template keeps the line breaks.
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EducationView {
    pub institution: String,
    pub degree: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificationView {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectView {
    pub title: String,
    /// Bullets joined by newlines.
    pub description: String,
}

impl From<&StructuredResume> for ResumeView {
    fn from(resume: &StructuredResume) -> Self {
        let info = &resume.personal_information;

        ResumeView {
            basic_details: BasicDetails {
                name: info.name.clone(),
                position: resume.most_match_role.clone(),
                email: info.email.clone(),
                linkedin: info.linkedin.clone(),
                location: String::new(),
                phone: info.phone.clone(),
            },
            summary: resume.professional_summary.clone(),
            experience: resume
                .work_experience
                .iter()
                .map(|exp| ExperienceView {
                    company: exp.company.clone(),
                    position: exp.title.clone(),
                    location: exp.location.clone(),
                    start_date: exp.start_date.clone(),
                    end_date: exp.end_date.clone(),
                    description: exp.descriptions.join("\n"),
                })
                .collect(),
            education: resume
                .education
                .iter()
                .map(|edu| EducationView {
                    institution: edu.institution.clone(),
                    degree: edu.degree.clone(),
                    location: edu.location.clone(),
                    start_date: edu.start_date.clone(),
                    end_date: edu.end_date.clone(),
                })
                .collect(),
            skills: resume.skills.clone(),
            certifications: resume
                .certifications
                .iter()
                .map(|cert| CertificationView {
                    title: cert.title().to_string(),
                    description: cert.description().to_string(),
                })
                .collect(),
            projects: resume
                .projects
                .iter()
                .map(|proj| ProjectView {
                    title: proj.title.clone(),
                    description: proj.description.join("\n"),
                })
                .collect(),
        }
    }
}
