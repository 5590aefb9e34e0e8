//! Prompt construction for the guide extraction model call.

/// Instruction block sent before the source text. The field list must
/// stay in lockstep with [`crate::types::Guide`]; a test below checks
/// it against the derived schema.
const GUIDE_EXTRACTION_INSTRUCTIONS: &str = r#"You turn instructional content (cooking videos, craft tutorials, how-to articles) into structured step-by-step guides.

Analyze the content below and extract a guide from it.

Return ONLY a JSON object, no prose before or after, with exactly these fields:
{
  "title": "short descriptive title",
  "type": "recipe" | "craft" | "howto" | "other",
  "category": "free-form category such as 'Italian cuisine' or 'woodworking', or null",
  "language": "language of the source content, lowercase English name",
  "ingredients": ["ingredient or material, with quantity when stated"],
  "steps": ["one imperative sentence per step, in order"],
  "duration": "total time as stated or estimated, or null",
  "servings": "yield or servings, or null",
  "difficulty": "easy" | "medium" | "hard" | null,
  "tips": ["helpful tip mentioned in the content"],
  "summary": "one or two sentences describing what this guide produces"
}

Rules:
- Keep steps concrete and actionable; merge filler talk into the nearest real step.
- Use the source's own quantities and times; never invent numbers.
- ingredients and tips may be empty arrays; steps must not be empty for instructional content.
- If the content is not instructional (song lyrics, a music video, pure narration with no actionable steps), say so in the summary and set type to "other".
- Write the guide in the same language as the source content."#;

/// Build the full prompt for one extraction call.
pub fn format_guide_prompt(text: &str, language_hint: Option<&str>) -> String {
    let language_line = match language_hint {
        Some(lang) => format!("The source language was detected as: {lang}.\n\n"),
        None => String::new(),
    };
    format!("{GUIDE_EXTRACTION_INSTRUCTIONS}\n\n{language_line}Content:\n\n{text}")
}
