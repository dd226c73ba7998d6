//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub selectors: SelectorsConfig,

    #[serde(default)]
    pub service: ServiceConfig,
}

/// Recommendation service client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_engine_timeout")]
    pub timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_engine_endpoint(),
            timeout_seconds: default_engine_timeout(),
        }
    }
}

fn default_engine_endpoint() -> String {
    "http://127.0.0.1:5000/".to_string()
}

fn default_engine_timeout() -> u64 {
    30
}

/// Retry policy for a single move-request cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Failures tolerated per cycle; reaching it escalates to Error.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed wait between attempts.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

/// How the extractor treats a ply element it cannot read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Log and skip the element.
    #[default]
    Lenient,
    /// Abort the extraction.
    Strict,
}

/// Controller behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub extract_mode: ExtractMode,

    /// Drop recommendations that resolve after the bot was stopped or
    /// restarted instead of injecting them.
    #[serde(default = "default_true")]
    pub discard_stale_moves: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            extract_mode: ExtractMode::default(),
            discard_stale_moves: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Browser (CDP) connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging endpoint.
    #[serde(default = "default_browser_endpoint")]
    pub endpoint: String,

    /// Substring of the URL of the tab to attach to.
    #[serde(default = "default_page_url_pattern")]
    pub page_url_pattern: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_browser_endpoint(),
            page_url_pattern: default_page_url_pattern(),
        }
    }
}

fn default_browser_endpoint() -> String {
    "http://localhost:9222".to_string()
}

fn default_page_url_pattern() -> String {
    "chess.com/play".to_string()
}

/// CSS selectors locating the page structures the controller reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorsConfig {
    #[serde(default = "default_ply_selector")]
    pub ply: String,

    #[serde(default = "default_figurine_selector")]
    pub figurine: String,

    #[serde(default = "default_figurine_attribute")]
    pub figurine_attribute: String,

    #[serde(default = "default_move_list_selector")]
    pub move_list: String,

    #[serde(default = "default_move_input_selector")]
    pub move_input: String,

    #[serde(default = "default_game_result_selector")]
    pub game_result: String,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            ply: default_ply_selector(),
            figurine: default_figurine_selector(),
            figurine_attribute: default_figurine_attribute(),
            move_list: default_move_list_selector(),
            move_input: default_move_input_selector(),
            game_result: default_game_result_selector(),
        }
    }
}

fn default_ply_selector() -> String {
    ".main-line-ply".to_string()
}

fn default_figurine_selector() -> String {
    ".icon-font-chess".to_string()
}

fn default_figurine_attribute() -> String {
    "data-figurine".to_string()
}

fn default_move_list_selector() -> String {
    ".play-controller-moveList".to_string()
}

fn default_move_input_selector() -> String {
    "#ccHelper-input".to_string()
}

fn default_game_result_selector() -> String {
    ".game-result".to_string()
}

/// Recommendation service (server side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_host")]
    pub host: String,

    #[serde(default = "default_service_port")]
    pub port: u16,

    /// UCI engine executable.
    #[serde(default = "default_engine_path")]
    pub engine_path: String,

    /// Thinking time per request.
    #[serde(default = "default_movetime_ms")]
    pub movetime_ms: u64,

    #[serde(default = "default_threads")]
    pub threads: u32,

    #[serde(default = "default_hash_mb")]
    pub hash_mb: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_service_host(),
            port: default_service_port(),
            engine_path: default_engine_path(),
            movetime_ms: default_movetime_ms(),
            threads: default_threads(),
            hash_mb: default_hash_mb(),
        }
    }
}

fn default_service_host() -> String {
    "127.0.0.1".to_string()
}

fn default_service_port() -> u16 {
    5000
}

fn default_engine_path() -> String {
    "stockfish".to_string()
}

fn default_movetime_ms() -> u64 {
    1000
}

fn default_threads() -> u32 {
    4
}

fn default_hash_mb() -> u32 {
    128
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
