//! Builds the request sent to the text-generation service.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use cluecard_core::textgen::GenerationRequest;

use super::guidance::GuidanceOverride;
use crate::config::EngineConfig;
use crate::domain::escalation::role_plan;
use crate::domain::subject::Subject;

const SYSTEM_PROMPT: &str = "You write clues for a party guessing game played out loud. \
Each clue is one short, friendly sentence a host could read to a group of friends. \
Keep it casual and concrete. Never sound like a critic or a film-studies essay. \
Never name the thing being guessed, never use digits for years, and never mention awards, \
streaming platforms or that the clue is a clue. Reply with JSON only.";

/// Assembles a request for `ladder_length` clues about `subject`.
#[must_use]
pub fn build_request(
    subject: &Subject,
    ladder_length: usize,
    config: &EngineConfig,
    guidance: &BTreeSet<GuidanceOverride>,
) -> GenerationRequest {
    let noun = subject.kind.noun();
    let mut user = String::new();

    let _ = writeln!(user, "Subject type: {noun}");
    let _ = writeln!(user, "Do not reveal: {}", subject.answer_text);

    if !subject.context_facts.is_empty() {
        let _ = writeln!(user, "\nBackground (for you only, do not quote it):");
        for (key, value) in &subject.context_facts {
            let _ = writeln!(user, "- {key}: {value}");
        }
    }

    let _ = writeln!(
        user,
        "\nWrite {ladder_length} clues about this {noun}, from vaguest to most revealing:"
    );
    for role in role_plan(subject.kind, ladder_length) {
        let _ = writeln!(user, "{}. {}", role.slot, role.instruction);
    }

    let _ = writeln!(user, "\nRules:");
    let _ = writeln!(user, "- Exactly {ladder_length} clues, in the order above.");
    let _ = writeln!(
        user,
        "- Each clue is one sentence of {} to {} words.",
        config.rules.min_words, config.generation.max_words_per_clue
    );
    let _ = writeln!(
        user,
        "- Never use any word from \"{}\".",
        subject.answer_text
    );
    let _ = writeln!(user, "- No years written as digits; say \"the nineties\" instead.");
    if config.rules.reject_list_separators {
        let _ = writeln!(user, "- No lists, colons, semicolons or slashes.");
    }

    if !guidance.is_empty() {
        let _ = writeln!(user, "\nExtra guidance:");
        for item in guidance {
            let _ = writeln!(user, "- {}", item.instruction());
        }
    }

    let _ = write!(
        user,
        "\nRespond with only this JSON object:\n{{\"clues\": [\"clue 1\", \"clue 2\", ...]}}"
    );

    GenerationRequest {
        system: SYSTEM_PROMPT.to_owned(),
        user,
    }
}
