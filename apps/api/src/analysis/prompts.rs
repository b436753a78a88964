// All LLM prompt constants for the Analysis module.

/// ATS scoring prompt template. Replace `{resume_text}` before sending.
/// The JSON shape below is what `normalize` expects; the wording around it is free to change.
pub const ATS_ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert ATS (Applicant Tracking System) specialist.
Analyze the following resume text for how well it would survive automated screening
and how compelling it is to a human recruiter.

RESUME TEXT:
"{resume_text}"

Return a JSON object with this EXACT schema (no extra fields):
{
  "atsScore": 78,
  "summary": "Two or three sentences on overall ATS readiness.",
  "strengths": ["Quantified achievements in most bullets"],
  "weaknesses": ["No dedicated skills section"],
  "suggestions": ["Add a skills section listing core technologies"]
}

Rules:
1. atsScore is an integer from 0 to 100.
2. summary is at most 1000 characters.
3. strengths, weaknesses and suggestions each hold between 1 and 6 short strings.
4. Judge keyword coverage, section structure, formatting that parsers choke on,
   quantified impact, and clarity.
5. Return ONLY the JSON object."#;
