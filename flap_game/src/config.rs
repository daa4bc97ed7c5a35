//! Game configuration.
//!
//! Every gameplay tuning constant lives here as plain data, constructed
//! once at startup and passed by reference — no process-wide singletons.

/// Fixed tuning for one run of the game.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Window width in pixels.
    pub width:  usize,
    /// Window height in pixels.
    pub height: usize,
    /// Ticks per second for the main loop.
    pub fps: u32,
    /// Minimum upward hip displacement per tick that counts as a jump.
    pub jump_threshold: f32,
    /// Seconds shown counting down between splash and play.
    pub countdown_secs: u32,
    /// Leaderboard rows rendered on the game-over screen.
    pub leaderboard_rows: usize,
    /// Maximum player-name length in characters.
    pub name_limit: usize,
    /// Retry a failed score save once before giving the score up.
    pub retry_failed_save: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width:             288,
            height:            512,
            fps:               30,
            jump_threshold:    0.03,
            countdown_secs:    5,
            leaderboard_rows:  5,
            name_limit:        12,
            retry_failed_save: true,
        }
    }
}

/// Normalize a player name: trim, substitute the default for an empty
/// result, and cap the length in characters.
pub fn sanitize_name(raw: &str, limit: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "Player".to_string();
    }
    trimmed.chars().take(limit.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_becomes_default() {
        assert_eq!(sanitize_name("", 12), "Player");
        assert_eq!(sanitize_name("   ", 12), "Player");
    }

    #[test]
    fn name_is_trimmed_and_capped() {
        assert_eq!(sanitize_name("  Ava  ", 12), "Ava");
        assert_eq!(sanitize_name("abcdefghijklmnop", 12), "abcdefghijkl");
    }

    #[test]
    fn multibyte_names_cap_by_characters() {
        assert_eq!(sanitize_name("ééééééééééééé", 12).chars().count(), 12);
    }
}
