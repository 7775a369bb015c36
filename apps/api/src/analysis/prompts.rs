// Prompt constants for the Resume Analyzer.
// Reuses the JSON-only fragment from llm_client::prompts.

use serde_json::{json, Value};

/// System prompt for keyword scoring. Output is a bare JSON object.
pub const KEYWORD_SCORE_SYSTEM: &str = "\
You are the backend engine for a resume analysis application. Given a job description and a \
candidate's resume, perform a technical keyword-based match analysis.

Focus strictly on hard skills, tools, technologies, certifications, and domain-specific terms. \
Ignore soft skills, verbs, general responsibilities, and action words. Normalize keywords \
(lowercase, singular/plural forms) before comparing.

1. current_score: an integer match percentage (0-100) between the resume and the job description, \
based only on the presence of relevant technical keywords.
2. missing_keywords: technical keywords from the job description that are absent from the resume \
and would raise the score if included. Only nouns or noun phrases naming tools, technologies, \
platforms, or certifications.
3. expected_score: the estimated match percentage if every missing keyword were added. It must be \
higher than current_score whenever any keyword is missing.

High match exception: if current_score is 85 or above, return an empty missing_keywords list and \
an expected_score equal to current_score.

Return exactly this JSON shape and nothing else:
{\"current_score\": <integer 0-100>, \"expected_score\": <integer 0-100>, \"missing_keywords\": [<strings>]}";

/// System prompt for the job-description-guided rewrite. Replace `{missing_keywords}`.
pub const TARGETED_REWRITE_SYSTEM: &str = "\
You are a professional resume optimizer. Rebuild the candidate's resume so it aligns as closely \
as possible with the job description while staying truthful to the candidate's background.

1. Compare the candidate's experience with the job description and elevate the most relevant \
experience, skills, and accomplishments.
2. Integrate every one of these missing keywords naturally across the Professional Summary, \
Skills, Work Experience, and Projects sections, using varied phrasing: {missing_keywords}
3. Give every Work Experience entry at least 5 bullet points with measurable impact, \
job-specific terminology, and varied action verbs.
4. Write a persuasive 3-5 sentence Professional Summary positioning the candidate for the role.
5. Set Most_Match_ROLE to the job title the candidate is best positioned for.

The response MUST conform to the provided JSON schema.";

/// System prompt for the keyword-only rewrite (no job description). Replace `{missing_keywords}`.
pub const KEYWORD_REWRITE_SYSTEM: &str = "\
You are a professional resume optimizer that enhances resumes by incorporating specific skills \
and keywords.

1. Review the resume to understand the candidate's experience, skills, and career trajectory.
2. Incorporate all of these keywords naturally, especially in the Professional Summary, Skills, \
Work Experience, and Projects sections: {missing_keywords}
3. Give every Work Experience entry at least 5 bullet points that quantify achievements and start \
with strong action verbs.
4. Write a compelling Professional Summary.
5. Set Most_Match_ROLE to the role that best matches the candidate's experience.

The response MUST conform to the provided JSON schema.";

/// Builds the user message carrying the resume and, when present, the job description.
pub fn resume_message(resume_text: &str, job_description: Option<&str>) -> String {
    match job_description {
        Some(jd) => format!("Resume Data = \"{resume_text}\" and Job Description = \"{jd}\""),
        None => format!("Resume Data = \"{resume_text}\""),
    }
}

/// JSON schema sent as the structured-output contract for resume rewrites.
pub fn structured_resume_schema() -> Value {
    let string = json!({ "type": "string" });
    let strings = json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "type": "object",
        "properties": {
            "Most_Match_ROLE": string,
            "Personal Information": {
                "type": "object",
                "properties": {
                    "Name": string,
                    "Phone number": string,
                    "Email": string,
                    "LinkedIn": string,
                    "GitHub/portfolio": string
                },
                "required": ["Name", "Phone number", "Email", "LinkedIn", "GitHub/portfolio"]
            },
            "Professional Summary": string,
            "Skills": strings,
            "Work Experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "Company": string,
                        "Title": string,
                        "location": string,
                        "start_date": string,
                        "end_date": string,
                        "Descriptions": strings
                    },
                    "required": ["Company", "Title", "location", "start_date", "end_date", "Descriptions"]
                }
            },
            "Education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "Institution": string,
                        "location": string,
                        "Degree": string,
                        "start_date": string,
                        "end_date": string
                    },
                    "required": ["Institution", "Degree", "location", "start_date", "end_date"]
                }
            },
            "Certifications": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "Title": string, "Description": string },
                    "required": ["Title", "Description"]
                }
            },
            "Projects": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "Title": string,
                        "Description": strings,
                        "Technologies": strings
                    },
                    "required": ["Title", "Description", "Technologies"]
                }
            },
            "Other": {
                "type": "object",
                "properties": { "Strengths": strings, "Languages": strings },
                "required": ["Strengths", "Languages"]
            }
        },
        "required": [
            "Most_Match_ROLE", "Personal Information", "Professional Summary", "Skills",
            "Work Experience", "Education", "Certifications", "Projects", "Other"
        ]
    })
}
