//! Per-call user prompt

use crate::core::models::TranslationRequest;

/// Terms the model gets wrong often enough to repeat on every call
pub const GLOSSARY_EXCERPT: &[(&str, &str)] = &[
    ("ショックキラー", "\"shock absorber\" (NEVER \"shock killer\")"),
    ("体系表", "\"System Chart\""),
    ("ストレート取付", "\"Inline Mount\""),
];

/// Build the user message; the Master document travels separately as system context.
pub fn build_prompt(request: &TranslationRequest) -> String {
    let mut prompt = format!(
        "Translate from {} to {}\n\nSOURCE TEXT:\n{}\n\nCRITICAL GLOSSARY:\n",
        request.source_lang.code().to_uppercase(),
        request.target_lang.code().to_uppercase(),
        request.text
    );
    for (term, rendering) in GLOSSARY_EXCERPT {
        prompt.push_str(&format!("- {} = {}\n", term, rendering));
    }
    prompt.push_str("\nApply every glossary entry and style rule from the system context.\n\n");
    prompt.push_str("Output ONLY the translation, no explanations.\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::LanguageCode;

    #[test]
    fn test_prompt_contents() {
        let request = TranslationRequest::new("ショックキラーを交換", LanguageCode::Ja, LanguageCode::En).unwrap();
        let prompt = build_prompt(&request);

        assert!(prompt.starts_with("Translate from JA to EN\n"));
        assert!(prompt.contains("SOURCE TEXT:\nショックキラーを交換\n"));
        assert!(prompt.contains("- ショックキラー = \"shock absorber\" (NEVER \"shock killer\")"));
        assert!(prompt.contains("- 体系表 = \"System Chart\""));
        assert!(prompt.contains("- ストレート取付 = \"Inline Mount\""));
        assert!(prompt.trim_end().ends_with("Output ONLY the translation, no explanations."));
    }

    #[test]
    fn test_source_text_is_verbatim() {
        let text = "  line one\n\tline two  ";
        let request = TranslationRequest::new(text, LanguageCode::Cn, LanguageCode::Tw).unwrap();
        let prompt = build_prompt(&request);
        assert!(prompt.starts_with("Translate from CN to TW"));
        assert!(prompt.contains(text));
    }
}
