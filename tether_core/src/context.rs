use serde::{Deserialize, Serialize};

/// Context window and token budget settings for every session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextConfig {
    /// Exchanges (user message plus its reply) kept uncompressed
    #[serde(default = "ContextConfig::default_window_size")]
    pub window_size: usize,
    /// Output budget when folding an evicted message into the summary
    #[serde(default = "ContextConfig::default_summary_token_budget")]
    pub summary_token_budget: u32,
    /// Output budget for the reply to a user turn
    #[serde(default = "ContextConfig::default_turn_token_budget")]
    pub turn_token_budget: u32,
    #[serde(default = "ContextConfig::default_system_prompt")]
    pub system_prompt: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_size: Self::default_window_size(),
            summary_token_budget: Self::default_summary_token_budget(),
            turn_token_budget: Self::default_turn_token_budget(),
            system_prompt: Self::default_system_prompt(),
        }
    }
}

impl ContextConfig {
    pub const DEFAULT_WINDOW_SIZE: usize = 6;
    pub const DEFAULT_SUMMARY_TOKEN_BUDGET: u32 = 120;
    pub const DEFAULT_TURN_TOKEN_BUDGET: u32 = 2000;

    const fn default_window_size() -> usize {
        Self::DEFAULT_WINDOW_SIZE
    }

    const fn default_summary_token_budget() -> u32 {
        Self::DEFAULT_SUMMARY_TOKEN_BUDGET
    }

    const fn default_turn_token_budget() -> u32 {
        Self::DEFAULT_TURN_TOKEN_BUDGET
    }

    fn default_system_prompt() -> String {
        "You are a helpful AI assistant.".to_string()
    }

    #[must_use]
    pub const fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// Settings for supervisor-style review of a whole transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewConfig {
    #[serde(default = "ReviewConfig::default_token_budget")]
    pub token_budget: u32,
    #[serde(default = "ReviewConfig::default_system_prompt")]
    pub system_prompt: String,
    /// Placed before the rendered transcript in the review request
    #[serde(default = "ReviewConfig::default_instructions")]
    pub instructions: String,
    /// Label for user turns in the rendered transcript
    #[serde(default = "ReviewConfig::default_user_label")]
    pub user_label: String,
    /// Label for assistant turns in the rendered transcript
    #[serde(default = "ReviewConfig::default_assistant_label")]
    pub assistant_label: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            token_budget: Self::default_token_budget(),
            system_prompt: Self::default_system_prompt(),
            instructions: Self::default_instructions(),
            user_label: Self::default_user_label(),
            assistant_label: Self::default_assistant_label(),
        }
    }
}

impl ReviewConfig {
    const fn default_token_budget() -> u32 {
        3000
    }

    fn default_system_prompt() -> String {
        "You are an experienced supervisor reviewing a practice conversation.".to_string()
    }

    fn default_instructions() -> String {
        "Analyse the following practice session, in which the trainee talked to a \
         simulated client.\n\n\
         Give professional feedback on:\n\
         1. The communication techniques the trainee used\n\
         2. How the trainee built rapport\n\
         3. Use of active listening\n\
         4. Handling of the client's resistance\n\
         5. Recommendations for improvement\n\n\
         Answer format:\n\
         - Short session summary\n\
         - Strengths\n\
         - Areas for improvement\n\
         - Concrete recommendations"
            .to_string()
    }

    fn default_user_label() -> String {
        "Trainee".to_string()
    }

    fn default_assistant_label() -> String {
        "Client".to_string()
    }
}
