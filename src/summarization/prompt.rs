//! Instruction assembly for the summarization request.

use crate::summarization::language;

/// Target verbosity of a summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthTier {
    /// One or two short paragraphs.
    Short,
    /// Two or three paragraphs.
    #[default]
    Medium,
    /// Three or more paragraphs with more detail.
    Detailed,
}

impl LengthTier {
    /// Parse a client-supplied label. Unknown or missing labels select [`LengthTier::Medium`].
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("short") => Self::Short,
            Some("detailed") => Self::Detailed,
            _ => Self::Medium,
        }
    }

    /// Wire label of the tier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Detailed => "detailed",
        }
    }

    /// Sentence telling the model how long the summary should be.
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Short => "Create a very concise summary in 1-2 short paragraphs.",
            Self::Medium => "Create a balanced summary in 2-3 paragraphs.",
            Self::Detailed => {
                "Create a comprehensive summary in 3 or more paragraphs that captures more details."
            }
        }
    }
}

/// Sentence asking for a translation, or `None` for absent, blank, or default-language codes.
pub fn translation_directive(output_language: Option<&str>) -> Option<String> {
    let code = output_language
        .map(str::trim)
        .filter(|code| !code.is_empty() && !language::is_default(code))?;
    Some(format!(
        "Translate the summary to {}.",
        language::display_name(code)
    ))
}

/// Compose the full instruction: source text, length directive, then the optional
/// translation directive.
pub fn build_instruction(text: &str, length: LengthTier, output_language: Option<&str>) -> String {
    let mut instruction = format!(
        "Summarize the following text:\n\n{text}\n\n{}",
        length.directive()
    );
    if let Some(translation) = translation_directive(output_language) {
        instruction.push('\n');
        instruction.push_str(&translation);
    }
    instruction
}
