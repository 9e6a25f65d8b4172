//! Prompt construction and the bot's canned messages.

use std::sync::LazyLock;

use regex::Regex;

/// Age assumed when the user does not mention one.
pub const DEFAULT_AGE: &str = "5";

/// Posted when a mention carries no description.
pub const USAGE_MESSAGE: &str = "👋 Hi! Please describe the childhood photo you'd like to generate.\n\n\
Examples:\n\
• `@MemoryBot my 2-year-old self in a backyard`\n\
• `@MemoryBot my 5-year-old self on a beach`\n\
• `@MemoryBot my 10-year-old self in a classroom`";

/// Posted right before a generation job is submitted.
pub const WORKING_MESSAGE: &str = "🎨 Creating your childhood memory... This may take 30-60 seconds.";

/// Title of the uploaded image.
pub const IMAGE_TITLE: &str = "Your Childhood Memory";

/// File name of the uploaded image.
pub const IMAGE_FILENAME: &str = "childhood_memory.webp";

static AGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)[-\s]?year[-\s]?old").expect("age pattern is valid"));

/// Remove the bot's own mention token and collapse whitespace.
pub fn extract_prompt(text: &str, bot_user_id: &str) -> String {
    let text = if bot_user_id.is_empty() { text.to_string() } else { text.replace(&format!("<@{bot_user_id}>"), "") };

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull the first "N-year-old" age out of the prompt.
pub fn extract_age(user_prompt: &str) -> Option<String> {
    AGE_PATTERN.captures(&user_prompt.to_lowercase()).map(|c| c[1].to_string())
}

/// Wrap the user's description with the trigger word and photo styling.
pub fn enhance_prompt(trigger_word: &str, user_prompt: &str) -> String {
    let age = extract_age(user_prompt).unwrap_or_else(|| DEFAULT_AGE.to_string());

    format!(
        "A vintage photograph of {trigger_word} as a {age}-year-old child, {user_prompt}, realistic childhood photo, natural lighting, candid moment, high quality"
    )
}

/// Caption posted alongside the image.
pub fn image_caption(user_prompt: &str) -> String {
    format!("✨ Here's your childhood memory: _{user_prompt}_")
}

/// Notice posted when generation fails.
pub fn failure_message(error: &impl std::fmt::Display) -> String {
    format!("❌ Sorry, I couldn't generate that image. Error: {error}")
}
