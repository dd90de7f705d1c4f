//! Fixed instructions sent with every conversion request

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that interprets unstructured resume text \
and structures it into a JSON format.";

const INSTRUCTIONS: &str = "\
You are a helpful assistant that interprets unstructured resume text and structures it into a JSON format. \
Extract and categorize the following sections and return them in English as a single JSON object:
- 'title': The person's name and professional title (e.g., 'Jane Doe - Software Engineer').
- 'summary': An object with 'professional_summary' (a brief overview of the person's career). \
Do NOT include a 'key_skills' field here, as skills belong only in the 'skills' section.
- 'education': An object where each key is an institution name, with the value being either a single \
string (e.g., 'Bachelor of Computer Science (2014-2018)') or a list of strings if multiple degrees are mentioned.
- 'experience': A list of objects, each describing a professional experience with the fields 'company', \
'role', 'timeline', 'description' and 'highlights' (a list of achievements).
- 'skills': A list of technical and soft skills mentioned anywhere in the text (e.g., ['JavaScript', 'Leadership']). \
This is the only section containing skills.
- 'additional_information': An object with fields like 'languages', 'citizenship', 'availability' and \
'interests' if present.
Always populate 'experience' and 'skills' when the text contains relevant information. \
Return a valid JSON object with these sections.";

/// User message for one conversion: instructions followed by the raw text
pub fn build_user_prompt(resume_text: &str) -> String {
    format!(
        "{}\n\nUnstructured resume text:\n\n{}",
        INSTRUCTIONS,
        resume_text.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_ends_with_text() {
        let prompt = build_user_prompt("  Jane Doe\nEngineer at Acme \n");

        assert!(prompt.starts_with("You are a helpful assistant"));
        assert!(prompt.contains("'additional_information'"));
        assert!(prompt.ends_with("Unstructured resume text:\n\nJane Doe\nEngineer at Acme"));
    }
}
