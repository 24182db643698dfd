use crate::engine::types::{Color, PieceType};

/// Game configuration parsed from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Whether the automated opponent plays at start-up.
    pub automated_opponent: bool,
    /// Side the automated opponent plays.
    pub automated_color: Color,
    /// Simulated thinking time before an automated move, in milliseconds.
    pub ai_delay_ms: u64,
    /// Fixed seed for the automated opponent's generator.
    pub ai_seed: Option<u64>,
    /// What an unspecified promotion becomes.
    pub default_promotion: PieceType,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        AppConfig {
            automated_opponent: lookup("CHESS_AI_ENABLED")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.automated_opponent),
            automated_color: lookup("CHESS_AI_COLOR")
                .and_then(|v| v.parse::<Color>().ok())
                .unwrap_or(defaults.automated_color),
            ai_delay_ms: lookup("CHESS_AI_DELAY")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.ai_delay_ms),
            ai_seed: lookup("CHESS_AI_SEED").and_then(|v| v.trim().parse().ok()),
            default_promotion: lookup("CHESS_DEFAULT_PROMOTION")
                .and_then(|v| v.parse::<PieceType>().ok())
                .filter(|kind| kind.is_promotion_target())
                .unwrap_or(defaults.default_promotion),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            automated_opponent: true,
            automated_color: Color::Black,
            ai_delay_ms: 1000,
            ai_seed: None,
            default_promotion: PieceType::Queen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert!(config.automated_opponent);
        assert_eq!(config.automated_color, Color::Black);
        assert_eq!(config.ai_delay_ms, 1000);
        assert_eq!(config.ai_seed, None);
        assert_eq!(config.default_promotion, PieceType::Queen);
    }

    #[test]
    fn empty_lookup_gives_defaults() {
        assert_eq!(from_pairs(&[]), AppConfig::default());
    }

    #[test]
    fn reads_every_key() {
        let config = from_pairs(&[
            ("CHESS_AI_ENABLED", "off"),
            ("CHESS_AI_COLOR", "white"),
            ("CHESS_AI_DELAY", "250"),
            ("CHESS_AI_SEED", "12345"),
            ("CHESS_DEFAULT_PROMOTION", "knight"),
        ]);
        assert!(!config.automated_opponent);
        assert_eq!(config.automated_color, Color::White);
        assert_eq!(config.ai_delay_ms, 250);
        assert_eq!(config.ai_seed, Some(12345));
        assert_eq!(config.default_promotion, PieceType::Knight);
    }

    #[test]
    fn garbage_falls_back() {
        let config = from_pairs(&[
            ("CHESS_AI_ENABLED", "maybe"),
            ("CHESS_AI_COLOR", "green"),
            ("CHESS_AI_DELAY", "-5"),
            ("CHESS_AI_SEED", "seed"),
            ("CHESS_DEFAULT_PROMOTION", "king"),
        ]);
        assert_eq!(config, AppConfig::default());
    }
}
