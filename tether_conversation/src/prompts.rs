//! Fixed prompt texts and sentinels.

pub const FOLD_SYSTEM_PROMPT: &str = "You are an assistant that edits a short dialogue summary.";

pub const FULL_SYSTEM_PROMPT: &str = "You are an assistant that summarizes dialogue history.";

/// Returned by `summarize_full` for a transcript with nothing to summarize.
pub const NOTHING_TO_SUMMARIZE: &str = "No significant history to summarize.";

/// Returned by `summarize_full` when the completion call failed.
pub const SUMMARY_UNAVAILABLE: &str = "Could not summarize the history.";

/// Returned by review when the transcript holds no user or assistant turns.
pub const NOTHING_TO_REVIEW: &str = "There is no conversation to review yet.";

/// Transcript entry written when a session is reset.
pub const RESET_MARKER: &str = "Conversation history cleared";

/// User-role transcript entry written before a review.
pub const REVIEW_REQUEST: &str = "Professional feedback requested";

pub const EMPTY_SUMMARY_PLACEHOLDER: &str = "—";

pub fn fold_prompt(existing_summary: &str, role: &str, content: &str) -> String {
    let current = if existing_summary.trim().is_empty() {
        EMPTY_SUMMARY_PLACEHOLDER
    } else {
        existing_summary
    };

    format!(
        "You have a short summary of a dialogue (it may be empty). \
         Below is a message that is about to be removed from the active context. \
         Add ONLY materially important information from it to the summary, if there is any. \
         If there is nothing important, return the summary unchanged. \
         Return ONLY the resulting summary, without explanations.\n\n\
         Current summary:\n{current}\n\n\
         New message:\n{role}: {content}"
    )
}

pub fn full_summary_prompt(history: &str) -> String {
    format!(
        "Briefly summarize the following dialogue history, keeping the key details \
         that may be needed to continue the conversation. Here is the history:\n\n{history}"
    )
}

/// System message carrying the running summary in an assembled context.
pub fn summary_context(summary: &str) -> String {
    format!("Summarized context: {summary}")
}
