use {
    crate::{framer::FramingMode, window::WindowDuration},
    std::{
        env,
        io::{BufRead, Write},
    },
};

pub const DEFAULT_FIREHOSE_URL: &str = "https://stream.twitter.com/1.1/statuses/sample.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    #[default]
    Console,
    Tui,
    JsonLines,
}

impl UiMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" => Some(UiMode::Console),
            "tui" => Some(UiMode::Tui),
            "jsonl" | "json" => Some(UiMode::JsonLines),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` until prompted for (see `prompt_window_minutes`)
    pub window: Option<WindowDuration>,
    pub firehose_url: String,
    pub bearer_token: Option<String>,
    /// Replay path instead of HTTP; `-` is stdin
    pub input_path: Option<String>,
    pub top_k: usize,
    pub render_interval_ms: u64,
    pub framing_mode: FramingMode,
    pub ui_mode: UiMode,
    pub reconnect_max_retries: u32,
    pub reconnect_initial_delay_secs: u64,
    pub reconnect_max_delay_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `WINDOW_MINUTES` (no default; prompted for when unset)
    /// - `FIREHOSE_URL` (default: sample stream endpoint)
    /// - `FIREHOSE_BEARER_TOKEN` (optional)
    /// - `FIREHOSE_INPUT` (optional replay file, `-` for stdin)
    /// - `TOP_K` (default: 10)
    /// - `RENDER_INTERVAL_MS` (default: 1000)
    /// - `FRAMING_MODE` (default: brace)
    /// - `UI_MODE` (default: console)
    /// - `RECONNECT_MAX_RETRIES` / `RECONNECT_INITIAL_DELAY_SECS` / `RECONNECT_MAX_DELAY_SECS` (5 / 1 / 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        let window = match env::var("WINDOW_MINUTES") {
            Ok(raw) => Some(WindowDuration::from_str(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(format!("WINDOW_MINUTES must be a positive integer, got '{}'", raw))
            })?),
            Err(_) => None,
        };

        let firehose_url = env::var("FIREHOSE_URL").unwrap_or_else(|_| DEFAULT_FIREHOSE_URL.to_string());
        if !firehose_url.starts_with("http://") && !firehose_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "FIREHOSE_URL must start with http:// or https://".to_string(),
            ));
        }

        let bearer_token = env::var("FIREHOSE_BEARER_TOKEN").ok().filter(|t| !t.is_empty());
        let input_path = env::var("FIREHOSE_INPUT").ok().filter(|p| !p.is_empty());

        let top_k = parse_or("TOP_K", 10usize)?;
        if top_k == 0 {
            return Err(ConfigError::InvalidValue("TOP_K must be at least 1".to_string()));
        }

        let framing_mode = match env::var("FRAMING_MODE") {
            Ok(raw) => FramingMode::from_str(&raw)
                .ok_or_else(|| ConfigError::InvalidValue(format!("Unknown FRAMING_MODE '{}'", raw)))?,
            Err(_) => FramingMode::default(),
        };

        let ui_mode = match env::var("UI_MODE") {
            Ok(raw) => UiMode::from_str(&raw)
                .ok_or_else(|| ConfigError::InvalidValue(format!("Unknown UI_MODE '{}'", raw)))?,
            Err(_) => UiMode::default(),
        };

        Ok(Self {
            window,
            firehose_url,
            bearer_token,
            input_path,
            top_k,
            render_interval_ms: parse_or("RENDER_INTERVAL_MS", 1_000u64)?,
            framing_mode,
            ui_mode,
            reconnect_max_retries: parse_or("RECONNECT_MAX_RETRIES", 5u32)?,
            reconnect_initial_delay_secs: parse_or("RECONNECT_INITIAL_DELAY_SECS", 1u64)?,
            reconnect_max_delay_secs: parse_or("RECONNECT_MAX_DELAY_SECS", 60u64)?,
        })
    }

    /// Apply `--tui`, `--jsonl` and `--framing <mode>` command-line overrides
    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        if args.iter().any(|a| a == "--tui") {
            self.ui_mode = UiMode::Tui;
        }
        if args.iter().any(|a| a == "--jsonl") {
            self.ui_mode = UiMode::JsonLines;
        }

        if let Some(idx) = args.iter().position(|a| a == "--framing") {
            let raw = args
                .get(idx + 1)
                .ok_or_else(|| ConfigError::InvalidValue("--framing needs a value".to_string()))?;
            self.framing_mode = FramingMode::from_str(raw)
                .ok_or_else(|| ConfigError::InvalidValue(format!("Unknown framing mode '{}'", raw)))?;
        }

        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{} is not a valid number: '{}'", var, raw))),
        Err(_) => Ok(default),
    }
}

/// Ask for the window length until a positive integer is entered.
///
/// Returns `MissingVariable` if input ends before a valid answer.
pub fn prompt_window_minutes<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<WindowDuration, ConfigError> {
    loop {
        writeln!(output, "Over how many minutes would you like to see the top tweets?")
            .and_then(|_| output.flush())
            .map_err(|e| ConfigError::InvalidValue(format!("Cannot write prompt: {}", e)))?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| ConfigError::InvalidValue(format!("Cannot read window: {}", e)))?;
        if read == 0 {
            return Err(ConfigError::MissingVariable("WINDOW_MINUTES".to_string()));
        }

        if let Some(window) = WindowDuration::from_str(&line) {
            return Ok(window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_retries_until_positive() {
        let mut input = Cursor::new("abc\n0\n\n7\n");
        let mut output = Vec::new();

        let window = prompt_window_minutes(&mut input, &mut output).unwrap();
        assert_eq!(window.minutes(), 7);

        let prompts = String::from_utf8(output).unwrap();
        assert_eq!(prompts.matches("Over how many minutes").count(), 4);
    }

    #[test]
    fn test_prompt_eof() {
        let mut input = Cursor::new("0\n");
        let mut output = Vec::new();

        let err = prompt_window_minutes(&mut input, &mut output).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVariable(_)));
    }

    #[test]
    fn test_env_config() {
        // Single test touching the environment to avoid races between tests
        for var in [
            "WINDOW_MINUTES",
            "FIREHOSE_URL",
            "FIREHOSE_BEARER_TOKEN",
            "FIREHOSE_INPUT",
            "TOP_K",
            "RENDER_INTERVAL_MS",
            "FRAMING_MODE",
            "UI_MODE",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.window, None);
        assert_eq!(config.firehose_url, DEFAULT_FIREHOSE_URL);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.render_interval_ms, 1_000);
        assert_eq!(config.framing_mode, FramingMode::BraceCount);
        assert_eq!(config.ui_mode, UiMode::Console);

        env::set_var("WINDOW_MINUTES", "15");
        env::set_var("TOP_K", "3");
        env::set_var("FRAMING_MODE", "string-aware");
        env::set_var("FIREHOSE_INPUT", "capture.json");
        let config = Config::from_env().unwrap();
        assert_eq!(config.window.map(|w| w.minutes()), Some(15));
        assert_eq!(config.top_k, 3);
        assert_eq!(config.framing_mode, FramingMode::StringAware);
        assert_eq!(config.input_path.as_deref(), Some("capture.json"));

        env::set_var("WINDOW_MINUTES", "0");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidValue(_))));
        env::set_var("WINDOW_MINUTES", "5");

        env::set_var("TOP_K", "0");
        assert!(Config::from_env().is_err());
        env::set_var("TOP_K", "3");

        env::set_var("FIREHOSE_URL", "ftp://example.com");
        assert!(Config::from_env().is_err());

        for var in ["WINDOW_MINUTES", "TOP_K", "FRAMING_MODE", "FIREHOSE_INPUT", "FIREHOSE_URL"] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_arg_overrides() {
        let mut config = Config {
            window: None,
            firehose_url: DEFAULT_FIREHOSE_URL.to_string(),
            bearer_token: None,
            input_path: None,
            top_k: 10,
            render_interval_ms: 1_000,
            framing_mode: FramingMode::BraceCount,
            ui_mode: UiMode::Console,
            reconnect_max_retries: 5,
            reconnect_initial_delay_secs: 1,
            reconnect_max_delay_secs: 60,
        };

        let args: Vec<String> = ["toptweets", "--tui", "--framing", "string-aware"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        config.apply_args(&args).unwrap();
        assert_eq!(config.ui_mode, UiMode::Tui);
        assert_eq!(config.framing_mode, FramingMode::StringAware);

        let bad: Vec<String> = vec!["toptweets".to_string(), "--framing".to_string()];
        assert!(config.apply_args(&bad).is_err());
    }
}
