//! Plain-text prompt rendering for completion-style models.

use parley_core::types::{HistoryTurn, Role};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Render turns as a `User:`/`Assistant:` transcript ending in an open
/// `Assistant:` line.
///
/// A `system` turn replaces `system_prompt`; blank turns are skipped; an
/// empty conversation gets a `User: Hello!` line.
pub fn build_prompt(turns: &[HistoryTurn], system_prompt: &str) -> String {
    let mut system = system_prompt.to_string();
    let mut lines = Vec::new();

    for turn in turns {
        let content = turn.content.trim();
        if content.is_empty() {
            continue;
        }
        match turn.role {
            Role::System => system = content.to_string(),
            Role::Assistant => lines.push(format!("Assistant: {}", content)),
            Role::User => lines.push(format!("User: {}", content)),
        }
    }

    if lines.is_empty() {
        lines.push("User: Hello!".to_string());
    }

    format!("{}\n{}\nAssistant:", system, lines.join("\n"))
}

/// Drop a leading copy of the submitted prompt from generated text, then trim.
pub fn strip_prompt_echo(generated: &str, prompt: &str) -> String {
    generated
        .strip_prefix(prompt)
        .unwrap_or(generated)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_transcript() {
        let turns = vec![
            HistoryTurn::new(Role::User, "hi"),
            HistoryTurn::new(Role::Assistant, "hello"),
            HistoryTurn::new(Role::User, "  how are you?  "),
        ];
        assert_eq!(
            build_prompt(&turns, DEFAULT_SYSTEM_PROMPT),
            "You are a helpful assistant.\nUser: hi\nAssistant: hello\nUser: how are you?\nAssistant:"
        );
    }

    #[test]
    fn test_build_prompt_system_override_and_blank_skip() {
        let turns = vec![
            HistoryTurn::new(Role::System, "Answer in French."),
            HistoryTurn::new(Role::User, "   "),
            HistoryTurn::new(Role::User, "bonjour"),
        ];
        assert_eq!(
            build_prompt(&turns, DEFAULT_SYSTEM_PROMPT),
            "Answer in French.\nUser: bonjour\nAssistant:"
        );
    }

    #[test]
    fn test_build_prompt_empty_conversation() {
        assert_eq!(
            build_prompt(&[], "Be concise."),
            "Be concise.\nUser: Hello!\nAssistant:"
        );
    }

    #[test]
    fn test_strip_prompt_echo() {
        let prompt = "sys\nUser: hi\nAssistant:";
        assert_eq!(strip_prompt_echo("sys\nUser: hi\nAssistant: Hey!", prompt), "Hey!");
        assert_eq!(strip_prompt_echo("  Hey!  ", prompt), "Hey!");
        assert_eq!(strip_prompt_echo(prompt, prompt), "");
    }
}
