//! Slash command parsing for the chat loop.
//!
//! Slash commands control the terminal session itself and never reach the
//! dispatcher. `#N` presses button N of the last keyboard shown; any other
//! `#` text goes to the bot.

use console::style;

/// Local controls recognised by the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Show the conversation's current scene.
    State,
    /// Re-print the last keyboard.
    Keyboard,
    /// Press a button of the last keyboard (1-based).
    Press(usize),
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a local command.
///
/// Returns `None` when the input should be sent to the bot.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();

    if let Some(number) = trimmed.strip_prefix('#').map(str::trim) {
        if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
            return Some(match number.parse::<usize>() {
                Ok(n) if n > 0 => ChatCommand::Press(n),
                _ => ChatCommand::Unknown(trimmed.to_string()),
            });
        }
    }

    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/state" => Some(ChatCommand::State),
        "/keyboard" | "/kb" => Some(ChatCommand::Keyboard),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}        {}", style("#N").cyan(), "Press button N of the last keyboard");
    println!("  {}     {}", style("/state").cyan(), "Show the current scene");
    println!("  {}  {}", style("/keyboard").cyan(), "Show the last keyboard again");
    println!("  {}     {}", style("/clear").cyan(), "Clear the screen");
    println!("  {}      {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!("  {}", style("Anything else is sent to the bot.").dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse("привет"), None);
        assert_eq!(parse("  hello /there"), None);
    }

    #[test]
    fn test_button_press() {
        assert_eq!(parse("#2"), Some(ChatCommand::Press(2)));
        assert_eq!(parse(" # 3 "), Some(ChatCommand::Press(3)));
        assert_eq!(parse("#0"), Some(ChatCommand::Unknown("#0".to_string())));
    }

    #[test]
    fn test_hash_text_goes_to_bot() {
        assert_eq!(parse("#pizza"), None);
        assert_eq!(parse("#x"), None);
        assert_eq!(parse("#"), None);
        assert_eq!(parse("#2 please"), None);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse("/EXIT"), Some(ChatCommand::Exit));
        assert_eq!(parse("/kb"), Some(ChatCommand::Keyboard));
        assert_eq!(parse("/state now"), Some(ChatCommand::State));
        assert_eq!(parse("/nope"), Some(ChatCommand::Unknown("/nope".to_string())));
    }
}
