//! Prompt construction for the navigation task.
//!
//! Text assembly only; which prompts are sent when is the engine's and
//! runner's business.

use crate::config::model_display_name;

const SYSTEM_TEMPLATE: &str = r#"You are playing the Wikipedia game. Starting from the current article, reach the target article "{target}" by clicking hyperlinks only.

Rules:
- Each turn you are shown the current article's text with its links in [text](url) format.
- Reply with exactly ONE link from the current article, copied verbatim as [text](url).
- Only links present in the article are valid moves.
- Reach the target in as few clicks as you can."#;

const USER_TEMPLATE: &str = r#"Current article: {title}

{content}

Which link do you click? Reply with exactly one [text](url) link from the article above."#;

/// Task preamble naming the target.
pub fn system_prompt(target: &str) -> String {
    SYSTEM_TEMPLATE.replace("{target}", target)
}

/// Per-turn prompt carrying the current page.
pub fn user_prompt(current_title: &str, content: &str) -> String {
    USER_TEMPLATE
        .replace("{title}", current_title)
        .replace("{content}", content)
}

/// Preamble carrying tips a model wrote after its baseline run.
pub fn tips_preamble(tips: &str) -> String {
    format!(
        "Before this game, you wrote down the following advice for yourself:\n\n{}\n\n",
        tips.trim()
    )
}

/// Preamble framing the attempt as a public ranking against rivals.
pub fn peer_pressure_preamble(
    model_id: &str,
    start: &str,
    target: &str,
    best_path_length: Option<u32>,
) -> String {
    let best = match best_path_length {
        Some(n) => format!("The optimal route takes {n} clicks."),
        None => "No optimal route is known for this pair.".to_string(),
    };
    format!(
        "You are {name}, competing live against other frontier models on the run \
         from \"{start}\" to \"{target}\". {best} Your click count is published \
         on a shared leaderboard and the other models will see it. Do not fall \
         behind.\n\n",
        name = model_display_name(model_id),
    )
}

/// Post-game request for transferable advice.
pub fn tips_request_prompt(won: bool, path: &[String], target: &str) -> String {
    let outcome = if won { "won" } else { "lost" };
    format!(
        "You just {outcome} a Wikipedia game trying to reach \"{target}\". \
         Your path was: {path}.\n\n\
         Write a short list of practical tips for playing this game well. \
         The tips will be handed to you before future games, so make them \
         general strategy, not facts about this particular route.",
        path = path.join(" -> "),
    )
}
