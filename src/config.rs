use crate::domain::parse_utc_offset;
use chrono::FixedOffset;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub prediction_policy: PredictionPolicy,
    pub streak_mode: StreakMode,
    pub streak_order: StreakOrder,
    pub streak_bonus_threshold: u32,
    pub reminder_lead_minutes: i64,
    pub reminder_poll_ms: u64,
    pub session_timeout_secs: i64,
    pub utc_offset: FixedOffset,
    pub leaderboard_limit: usize,
    pub admin_users: Vec<i64>,
    pub reject_duplicate_matches: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_api_url: String,
}

/// What happens when a participant predicts the same match twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionPolicy {
    /// The second prediction is rejected.
    OneShot,
    /// The second prediction replaces the first while the window is open.
    Overwrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakMode {
    /// Consecutive hits are tracked and earn the multiplier.
    Bonus,
    /// Base points are awarded as-is and streaks are not tracked.
    Off,
}

/// Order in which resolved matches feed the streak counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakOrder {
    /// The order results are recorded in.
    Recorded,
    /// Kickoff order; every result entry replays all resolved matches.
    Chronological,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or_default::<u16>(&env_map, "PORT", "8080", "must be a valid u16")?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let prediction_policy = match env_map
            .get("PREDICTION_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("one-shot")
        {
            "one-shot" => PredictionPolicy::OneShot,
            "overwrite" => PredictionPolicy::Overwrite,
            other => {
                return Err(ConfigError::InvalidValue(
                    "PREDICTION_POLICY".to_string(),
                    format!("must be one-shot or overwrite, got {}", other),
                ))
            }
        };

        let streak_mode = match env_map
            .get("STREAK_MODE")
            .map(|s| s.as_str())
            .unwrap_or("bonus")
        {
            "bonus" => StreakMode::Bonus,
            "off" => StreakMode::Off,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STREAK_MODE".to_string(),
                    format!("must be bonus or off, got {}", other),
                ))
            }
        };

        let streak_order = match env_map
            .get("STREAK_ORDER")
            .map(|s| s.as_str())
            .unwrap_or("recorded")
        {
            "recorded" => StreakOrder::Recorded,
            "chronological" => StreakOrder::Chronological,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STREAK_ORDER".to_string(),
                    format!("must be recorded or chronological, got {}", other),
                ))
            }
        };

        let streak_bonus_threshold = parse_or_default::<u32>(
            &env_map,
            "STREAK_BONUS_THRESHOLD",
            "3",
            "must be a valid u32",
        )?;
        if streak_bonus_threshold == 0 {
            return Err(ConfigError::InvalidValue(
                "STREAK_BONUS_THRESHOLD".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let reminder_lead_minutes = parse_or_default::<i64>(
            &env_map,
            "REMINDER_LEAD_MINUTES",
            "30",
            "must be a valid i64",
        )?;
        if reminder_lead_minutes < 0 {
            return Err(ConfigError::InvalidValue(
                "REMINDER_LEAD_MINUTES".to_string(),
                "must not be negative".to_string(),
            ));
        }

        let reminder_poll_ms =
            parse_or_default::<u64>(&env_map, "REMINDER_POLL_MS", "30000", "must be a valid u64")?;
        if reminder_poll_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "REMINDER_POLL_MS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let session_timeout_secs = parse_or_default::<i64>(
            &env_map,
            "SESSION_TIMEOUT_SECS",
            "300",
            "must be a valid i64",
        )?;
        if session_timeout_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TIMEOUT_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let utc_offset = parse_utc_offset(
            env_map
                .get("UTC_OFFSET")
                .map(|s| s.as_str())
                .unwrap_or("+00:00"),
        )
        .map_err(|e| ConfigError::InvalidValue("UTC_OFFSET".to_string(), e.to_string()))?;

        let leaderboard_limit = parse_or_default::<usize>(
            &env_map,
            "LEADERBOARD_LIMIT",
            "20",
            "must be a valid usize",
        )?;

        let admin_users = parse_admin_users(&env_map)?;

        let reject_duplicate_matches = parse_or_default::<bool>(
            &env_map,
            "REJECT_DUPLICATE_MATCHES",
            "false",
            "must be true or false",
        )?;

        let telegram_bot_token = env_map
            .get("TELEGRAM_BOT_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let telegram_api_url = env_map
            .get("TELEGRAM_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.telegram.org".to_string());

        Ok(Config {
            port,
            database_path,
            prediction_policy,
            streak_mode,
            streak_order,
            streak_bonus_threshold,
            reminder_lead_minutes,
            reminder_poll_ms,
            session_timeout_secs,
            utc_offset,
            leaderboard_limit,
            admin_users,
            reject_duplicate_matches,
            telegram_bot_token,
            telegram_api_url,
        })
    }
}

fn parse_or_default<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
    expectation: &str,
) -> Result<T, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.as_str())
        .unwrap_or(default)
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), expectation.to_string()))
}

fn parse_admin_users(env_map: &HashMap<String, String>) -> Result<Vec<i64>, ConfigError> {
    let Some(users_str) = env_map.get("ADMIN_USERS") else {
        return Ok(Vec::new());
    };

    users_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "ADMIN_USERS".to_string(),
                    format!("{} is not a numeric user id", s),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.prediction_policy, PredictionPolicy::OneShot);
        assert_eq!(config.streak_mode, StreakMode::Bonus);
        assert_eq!(config.streak_order, StreakOrder::Recorded);
        assert_eq!(config.streak_bonus_threshold, 3);
        assert_eq!(config.reminder_lead_minutes, 30);
        assert_eq!(config.leaderboard_limit, 20);
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert!(config.admin_users.is_empty());
        assert!(!config.reject_duplicate_matches);
        assert!(config.telegram_bot_token.is_none());
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_prediction_policy() {
        let mut env_map = setup_required_env();
        env_map.insert("PREDICTION_POLICY".to_string(), "both".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PREDICTION_POLICY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_overwrite_policy_and_chronological_order() {
        let mut env_map = setup_required_env();
        env_map.insert("PREDICTION_POLICY".to_string(), "overwrite".to_string());
        env_map.insert("STREAK_ORDER".to_string(), "chronological".to_string());
        env_map.insert("STREAK_MODE".to_string(), "off".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.prediction_policy, PredictionPolicy::Overwrite);
        assert_eq!(config.streak_order, StreakOrder::Chronological);
        assert_eq!(config.streak_mode, StreakMode::Off);
    }

    #[test]
    fn test_zero_streak_threshold_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("STREAK_BONUS_THRESHOLD".to_string(), "0".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "STREAK_BONUS_THRESHOLD"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_intervals_rejected() {
        for key in ["REMINDER_POLL_MS", "SESSION_TIMEOUT_SECS"] {
            let mut env_map = setup_required_env();
            env_map.insert(key.to_string(), "0".to_string());
            match Config::from_env_map(env_map) {
                Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, key),
                _ => panic!("Expected InvalidValue error for {}", key),
            }
        }
    }

    #[test]
    fn test_invalid_utc_offset() {
        let mut env_map = setup_required_env();
        env_map.insert("UTC_OFFSET".to_string(), "Europe/Berlin".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "UTC_OFFSET"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_admin_users_parsed() {
        let mut env_map = setup_required_env();
        env_map.insert("ADMIN_USERS".to_string(), " 12, 34 ,,56".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.admin_users, vec![12, 34, 56]);
    }

    #[test]
    fn test_admin_users_must_be_numeric() {
        let mut env_map = setup_required_env();
        env_map.insert("ADMIN_USERS".to_string(), "12,alice".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "ADMIN_USERS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_blank_telegram_token_is_ignored() {
        let mut env_map = setup_required_env();
        env_map.insert("TELEGRAM_BOT_TOKEN".to_string(), "   ".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert!(config.telegram_bot_token.is_none());
    }
}
