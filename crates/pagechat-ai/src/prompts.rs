//! Prompt text shared by the remote engines.

use std::sync::OnceLock;

use pagechat_common::{CharacterType, ConversationTurn};
use regex::Regex;

/// Upper bound on suggested questions taken from one response.
pub const MAX_SUGGESTED_QUESTIONS: usize = 3;

fn content_tag(is_video: bool) -> &'static str {
    if is_video {
        "transcript"
    } else {
        "page"
    }
}

/// System prompt, embedding the page (or video transcript) when there is one.
pub fn system_prompt(is_video: bool, page_content: &str) -> String {
    let mut prompt = String::from(
        "You are a helpful assistant built into a web browser. \
         Answer concisely and truthfully. If you do not know, say so.",
    );
    if !page_content.is_empty() {
        let tag = content_tag(is_video);
        let what = if is_video { "video transcript" } else { "web page" };
        prompt.push_str(&format!(
            "\n\nThe user is looking at the {what} inside <{tag}> tags. \
             Use it to answer when it is relevant.\n\n<{tag}>\n{page_content}\n</{tag}>"
        ));
    }
    prompt
}

/// Instruction asking for follow-up questions in `<question>` tags.
pub fn question_request(is_video: bool) -> String {
    let what = if is_video { "video" } else { "page" };
    format!(
        "Propose up to {MAX_SUGGESTED_QUESTIONS} very short questions a reader might ask \
         about this {what}. Put each question inside <question></question> tags and \
         write nothing else."
    )
}

fn question_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<question>(.*?)</question>").expect("valid question regex")
    })
}

/// Extract questions from a `<question>`-tagged response.
pub fn parse_questions(text: &str) -> Vec<String> {
    question_pattern()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|q| !q.is_empty())
        .take(MAX_SUGGESTED_QUESTIONS)
        .collect()
}

/// Remove every match of `pattern` from `text` in place, repeating until
/// removals no longer leave a new match behind.
pub fn strip_matches(text: &mut String, pattern: &Regex) {
    while pattern.is_match(text) {
        *text = pattern.replace_all(text, "").into_owned();
    }
}

/// History plus the new input as strictly alternating turns.
///
/// Empty turns are dropped and consecutive turns by the same author are
/// merged (a human turn is left unanswered when a request fails). The
/// result always starts and ends with a human turn.
pub fn alternating_turns(
    history: &[ConversationTurn],
    human_input: &str,
) -> Vec<(CharacterType, String)> {
    let turns = history
        .iter()
        .map(|t| (t.character_type, t.text.as_str()))
        .chain(std::iter::once((CharacterType::Human, human_input)))
        .filter(|(_, text)| !text.trim().is_empty());

    let mut merged: Vec<(CharacterType, String)> = Vec::new();
    for (role, text) in turns {
        match merged.last_mut() {
            Some((last_role, last_text)) if *last_role == role => {
                last_text.push_str("\n\n");
                last_text.push_str(text);
            }
            _ => merged.push((role, text.to_string())),
        }
    }

    if matches!(merged.first(), Some((CharacterType::Assistant, _))) {
        merged.remove(0);
    }
    merged
}
