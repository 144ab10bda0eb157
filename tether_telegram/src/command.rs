use teloxide::types::{BotCommand, KeyboardButton, KeyboardMarkup};

pub const CONSENT_BUTTON: &str = "✅ I agree";
pub const CLEAR_BUTTON: &str = "🧹 Clear memory";
pub const FEEDBACK_BUTTON: &str = "📝 Feedback";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the introduction and ask for consent
    Start,
    /// Consent given: start the session
    Agree,
    Reset,
    Feedback,
    Help,
}

impl Command {
    fn all() -> Vec<BotCommand> {
        [
            ("start", "Start over and read the introduction"),
            ("agree", "Give consent and begin the session"),
            ("reset", "Clear the conversation memory"),
            ("feedback", "Get feedback on the session so far"),
            ("help", "Show help"),
        ]
        .into_iter()
        .map(|(command, description)| BotCommand::new(command, description))
        .collect()
    }

    #[must_use]
    pub fn bot_commands() -> Vec<BotCommand> {
        Self::all()
    }

    /// Parse a slash command (optionally addressed as `/cmd@bot_name`) or one
    /// of the keyboard button labels.
    #[must_use]
    pub fn parse_from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            CONSENT_BUTTON => return Some(Self::Agree),
            CLEAR_BUTTON => return Some(Self::Reset),
            FEEDBACK_BUTTON => return Some(Self::Feedback),
            _ => {}
        }

        let word = text.split_whitespace().next()?;
        let word = word.split('@').next().unwrap_or(word).to_lowercase();

        match word.as_str() {
            "/start" => Some(Self::Start),
            "/agree" => Some(Self::Agree),
            "/reset" | "/clear" => Some(Self::Reset),
            "/feedback" => Some(Self::Feedback),
            "/help" => Some(Self::Help),
            _ => None,
        }
    }

    /// Keyboard shown once the session runs.
    #[must_use]
    pub fn session_keyboard() -> KeyboardMarkup {
        KeyboardMarkup::new(vec![vec![
            KeyboardButton::new(CLEAR_BUTTON),
            KeyboardButton::new(FEEDBACK_BUTTON),
        ]])
        .resize_keyboard()
    }

    /// One-time keyboard carrying the consent button.
    #[must_use]
    pub fn consent_keyboard() -> KeyboardMarkup {
        KeyboardMarkup::new(vec![vec![KeyboardButton::new(CONSENT_BUTTON)]])
            .resize_keyboard()
            .one_time_keyboard()
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"
🤖 Tether practice bot

Commands:
/start    - Read the introduction
/agree    - Give consent and begin the session
/reset    - Clear the conversation memory (alias /clear)
/feedback - Get supervisor feedback on the session
/help     - Show this help

After giving consent, just send messages to talk.
"
    }

    #[must_use]
    pub const fn welcome_text() -> &'static str {
        r"
👋 Welcome to the practice simulator!

🤖 The bot plays a simulated client so you can practise conversation skills.
It is meant for training only and is no substitute for real help.

🔒 Privacy and consent:
1. The whole dialogue is stored for reviewing your training progress
2. Your messages are only used to generate the bot's replies
3. Continuing requires your consent to this processing

✅ Press the button below or send /agree to confirm that you understand
the training nature of the bot and agree to the dialogue being stored.
"
    }

    #[must_use]
    pub const fn not_started_text() -> &'static str {
        "Please give your consent first: send /start and then /agree."
    }
}
