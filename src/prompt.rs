use serde::Serialize;

use crate::config::PromptStyle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage { role: "user".to_string(), content: content.into() }
    }
}

/// What gets sent upstream for one idea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Completion(String),
    Chat(Vec<ChatMessage>),
}

impl Prompt {
    pub fn for_style(style: PromptStyle, idea: &str) -> Self {
        match style {
            PromptStyle::Completion => Prompt::Completion(build_completion_prompt(idea)),
            PromptStyle::Chat => Prompt::Chat(build_chat_messages(idea)),
        }
    }
}

const LANDING_PAGE_SYSTEM_PROMPT: &str = "You are an expert web designer who writes production-ready landing pages.

Return ONE complete, self-contained HTML document (<!DOCTYPE html> through </html>) with all styling inline or in a single <style> block. Do not reference external stylesheets, scripts or fonts. Do not include any JavaScript. Do not wrap the document in markdown or add commentary.

The page MUST contain these six sections, in this order:
1. Hero: a headline, a one-sentence value proposition and a prominent call-to-action button.
2. What you will learn: at least 4 learning points or key benefits.
3. Testimonials: at least 2 customer testimonials with names.
4. Pricing: exactly 3 plans, each with a name, price, feature list and a buy button.
5. Final call-to-action: a closing pitch with a prominent buy button.
6. Footer: copyright line and basic links.

Use a green and white colour scheme. Keep the layout modern and responsive.";

/// Flat variant: one instruction with the idea embedded verbatim.
pub fn build_completion_prompt(idea: &str) -> String {
    format!(
        "I have a business service idea: {}. Using your internal logic, generate a complete landing page design that best represents this idea. \
Automatically determine the optimal sections (such as a hero introduction, features, testimonials, pricing, and a call-to-action) \
and ensure that a buy button is included prominently within the design. \
Output a fully functional HTML/CSS code snippet that is modern, responsive, and ready for further customization.",
        idea
    )
}

/// Structured variant: fixed system instruction plus the idea as the user turn.
pub fn build_chat_messages(idea: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(LANDING_PAGE_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Create a landing page for this business idea: {}",
            idea
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_prompt_embeds_idea_verbatim() {
        let prompt = build_completion_prompt("dog walking <service> & \"more\"");
        assert!(prompt.contains("I have a business service idea: dog walking <service> & \"more\"."));
        assert!(prompt.contains("buy button"));
        assert!(prompt.contains("HTML/CSS"));
    }

    #[test]
    fn test_chat_messages_shape() {
        let messages = build_chat_messages("yoga retreats");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.ends_with("yoga retreats"));
        assert!(!messages[0].content.contains("yoga retreats"));
    }

    #[test]
    fn test_system_prompt_lists_required_sections() {
        let system = &build_chat_messages("")[0].content;
        for needle in [
            "Hero",
            "at least 4 learning points",
            "at least 2 customer testimonials",
            "exactly 3 plans",
            "Final call-to-action",
            "Footer",
            "green and white",
            "self-contained",
        ] {
            assert!(system.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn test_empty_idea_is_accepted() {
        match Prompt::for_style(PromptStyle::Completion, "") {
            Prompt::Completion(text) => assert!(text.starts_with("I have a business service idea: .")),
            other => panic!("unexpected prompt {other:?}"),
        }
        assert!(matches!(Prompt::for_style(PromptStyle::Chat, ""), Prompt::Chat(_)));
    }
}
