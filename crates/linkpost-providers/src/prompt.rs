//! Prompt construction for post generation and refinement.

use linkpost_core::types::{
    UserConfig, default_audience, default_background, default_post_length, default_tone,
};

pub const COMPOSE_SYSTEM_PROMPT: &str = "You are an expert LinkedIn content creator. \
Your task is to create engaging, professional LinkedIn posts that provide real value to \
readers in the tech industry.";

pub const REFINE_SYSTEM_PROMPT: &str = "You are an expert LinkedIn content creator. \
Your task is to refine an existing LinkedIn post based on user feedback. Maintain the \
professional tone and ensure the post includes a hook, valuable content, an engagement \
question, and a call-to-action.";

/// Use `value` unless it is blank.
fn or_default(value: &str, default: fn() -> String) -> String {
    if value.trim().is_empty() {
        default()
    } else {
        value.to_string()
    }
}

/// Build the user prompt for a new post about `topic`.
pub fn compose_prompt(topic: &str, style: &UserConfig, additional_context: &str) -> String {
    let background = or_default(&style.professional_background, default_background);
    let audience = or_default(&style.target_audience, default_audience);
    let tone = or_default(&style.tone, default_tone);
    let length = or_default(&style.post_length, default_post_length);

    let mut prompt = format!(
        "Create a professional LinkedIn post about {topic} that follows this structure:

1. Start with an engaging hook that grabs attention.
2. Main content that provides concrete value about {topic}.
3. Include an engagement question to invite reader feedback.
4. End with a strong call-to-action.

Additional details:
- Professional background: {background}
- Target audience: {audience}
- Preferred tone: {tone}
- Post length: {length}
"
    );

    let context = additional_context.trim();
    if !context.is_empty() {
        prompt.push_str(&format!("- Additional context: {context}\n"));
    }

    prompt.push_str(
        "
The post MUST include:
- A memorable hook at the beginning
- Educational content that demonstrates expertise
- An open-ended question to encourage comments
- A clear call-to-action at the end",
    );
    prompt
}

/// Build the user prompt for refining an existing post.
pub fn refine_prompt(original: &str, feedback: &str) -> String {
    format!(
        "Original post:\n{original}\n\nFeedback:\n{feedback}\n\n\
         Please refine this LinkedIn post based on the feedback provided."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_prompt_includes_style() {
        let mut style = UserConfig::default();
        style.tone = "Witty".into();
        let prompt = compose_prompt("Rust", &style, "Mention the borrow checker");
        assert!(prompt.contains("about Rust"));
        assert!(prompt.contains("Preferred tone: Witty"));
        assert!(prompt.contains("Additional context: Mention the borrow checker"));
    }

    #[test]
    fn test_blank_style_fields_fall_back_to_defaults() {
        let mut style = UserConfig::default();
        style.professional_background = String::new();
        style.target_audience = "  ".into();
        let prompt = compose_prompt("Rust", &style, "");
        assert!(prompt.contains("Professional background: Web Developer"));
        assert!(prompt.contains("Target audience: Web developers and tech professionals"));
        assert!(!prompt.contains("Additional context"));
    }

    #[test]
    fn test_refine_prompt() {
        let prompt = refine_prompt("Old post", "Shorter please");
        assert!(prompt.contains("Original post:\nOld post"));
        assert!(prompt.contains("Feedback:\nShorter please"));
    }
}
