//! Llama 2 chat prompt rendering.

use pagechat_common::{CharacterType, ConversationTurn};

use crate::prompts::alternating_turns;

const BOS: &str = "<s>";
const EOS: &str = "</s>";
const INST_START: &str = "[INST]";
const INST_END: &str = "[/INST]";
const SYS_START: &str = "<<SYS>>";
const SYS_END: &str = "<</SYS>>";

/// Stop sequences sent with every completion request.
pub(crate) const STOP_SEQUENCES: [&str; 2] = [EOS, INST_START];

/// Render the system prompt, history, and new input as one prompt.
///
/// The system block rides inside the first instruction. Every answered
/// exchange is closed with `</s>`; the final instruction is left open for
/// the model to complete.
pub(crate) fn build_prompt(
    system: &str,
    history: &[ConversationTurn],
    human_input: &str,
) -> String {
    let mut prompt = String::new();
    let mut first = true;

    for (role, text) in alternating_turns(history, human_input) {
        match role {
            CharacterType::Human => {
                prompt.push_str(BOS);
                prompt.push_str(INST_START);
                prompt.push(' ');
                if first {
                    prompt.push_str(&format!("{SYS_START}\n{system}\n{SYS_END}\n\n"));
                    first = false;
                }
                prompt.push_str(text.trim());
                prompt.push(' ');
                prompt.push_str(INST_END);
            }
            CharacterType::Assistant => {
                prompt.push(' ');
                prompt.push_str(text.trim());
                prompt.push(' ');
                prompt.push_str(EOS);
            }
        }
    }
    prompt
}
