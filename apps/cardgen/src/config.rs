use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Application configuration, built once at startup and handed to every component.
///
/// Every environment variable is optional; missing values fall back to the defaults
/// below. Malformed numeric values are reported as errors instead of being ignored.
#[derive(Debug, Clone)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub theme: Theme,
    pub branding: Branding,
    /// Number of records rendered per run.
    pub batch_size: usize,
    /// Explanations at or above this many characters are skipped while fresh records remain.
    pub explanation_ceiling: usize,
    /// Font-size floor applied by the fit policy.
    pub min_font_px: u32,
    /// Fixed RNG seed for reproducible selection. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub paths: Paths,
    pub rust_log: String,
}

/// Fixed canvas geometry shared by both card faces.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Outer padding used by the header and badge.
    pub padding: i32,
    pub panel_margin_top: i32,
    pub panel_margin_bottom: i32,
    pub panel_margin_x: i32,
    pub panel_radius: i32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: 1080,
            height: 1350,
            padding: 80,
            panel_margin_top: 220,
            panel_margin_bottom: 180,
            panel_margin_x: 60,
            panel_radius: 60,
        }
    }
}

pub type Rgb = [u8; 3];

/// Card palette ("Midnight Prism").
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub bg_top: Rgb,
    pub bg_bottom: Rgb,
    pub accent_cyan: Rgb,
    pub accent_gold: Rgb,
    pub accent_green: Rgb,
    pub text_main: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            bg_top: [13, 13, 22],
            bg_bottom: [5, 5, 10],
            accent_cyan: [6, 182, 212],
            accent_gold: [245, 158, 11],
            accent_green: [16, 185, 129],
            text_main: [248, 250, 252],
        }
    }
}

/// Static captions drawn on every card.
#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    pub brand_name: String,
    pub footer_caption: String,
    pub call_to_action: String,
    pub answer_label: String,
    pub explanation_label: String,
}

impl Default for Branding {
    fn default() -> Self {
        Branding {
            brand_name: "PG PATHSCHEDULER".to_string(),
            footer_caption: "MEDICAL EXCELLENCE".to_string(),
            call_to_action: "SWIPE TO REVEAL >>".to_string(),
            answer_label: "CORRECT ANSWER".to_string(),
            explanation_label: "DEEP INSIGHT:".to_string(),
        }
    }
}

/// Filesystem locations for inputs, outputs and optional assets.
#[derive(Debug, Clone)]
pub struct Paths {
    pub question_bank: PathBuf,
    pub output_dir: PathBuf,
    pub history_file: PathBuf,
    pub manifest_file: PathBuf,
    pub logo: PathBuf,
    /// Probed in order; the first directory holding a loadable candidate wins.
    pub font_dirs: Vec<PathBuf>,
}

impl Paths {
    /// Derives the standard layout: history and manifest inside `output_dir`,
    /// logo and bundled fonts inside `assets_dir`.
    pub fn new(question_bank: PathBuf, output_dir: PathBuf, assets_dir: PathBuf) -> Self {
        let mut font_dirs = vec![assets_dir.join("fonts")];
        font_dirs.extend(platform_font_dirs());

        Paths {
            question_bank,
            history_file: output_dir.join("flashcard_history.json"),
            manifest_file: output_dir.join("daily_flashcards.json"),
            logo: assets_dir.join("logo.png"),
            output_dir,
            font_dirs,
        }
    }
}

impl Config {
    /// Builds a config with default canvas, theme and batch settings around `paths`.
    pub fn with_paths(paths: Paths) -> Self {
        Config {
            canvas: CanvasConfig::default(),
            theme: Theme::default(),
            branding: Branding::default(),
            batch_size: 5,
            explanation_ceiling: 600,
            min_font_px: 20,
            seed: None,
            paths,
            rust_log: "info".to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let output_dir = match std::env::var("CARDGEN_OUTPUT_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_output_dir(),
        };
        let assets_dir = env_path("CARDGEN_ASSETS_DIR", "assets");
        let question_bank =
            env_path("CARDGEN_QUESTION_BANK", "neetpg_app/assets/flashcards.json");

        let mut paths = Paths::new(question_bank, output_dir, assets_dir);
        if let Ok(history) = std::env::var("CARDGEN_HISTORY_FILE") {
            paths.history_file = PathBuf::from(history);
        }
        if let Ok(manifest) = std::env::var("CARDGEN_MANIFEST_FILE") {
            paths.manifest_file = PathBuf::from(manifest);
        }
        if let Ok(logo) = std::env::var("CARDGEN_LOGO") {
            paths.logo = PathBuf::from(logo);
        }

        let mut config = Config::with_paths(paths);
        config.batch_size = parse_env("CARDGEN_BATCH_SIZE", config.batch_size)?;
        config.explanation_ceiling =
            parse_env("CARDGEN_EXPLANATION_CEILING", config.explanation_ceiling)?;
        config.min_font_px = parse_env("CARDGEN_MIN_FONT_PX", config.min_font_px)?;
        config.seed = match std::env::var("CARDGEN_SEED") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("CARDGEN_SEED must be an unsigned integer")?,
            ),
            Err(_) => None,
        };
        config.rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(config)
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".n8n-files")
        .join("flashcards")
}

/// System font directories, searched after the bundled assets.
fn platform_font_dirs() -> Vec<PathBuf> {
    let dirs: &[&str] = if cfg!(target_os = "windows") {
        &["C:\\Windows\\Fonts"]
    } else if cfg!(target_os = "macos") {
        &["/Library/Fonts", "/System/Library/Fonts/Supplemental"]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu",
            "/usr/share/fonts/TTF",
            "/usr/share/fonts/truetype/msttcorefonts",
        ]
    };
    dirs.iter().map(|d| Path::new(d).to_path_buf()).collect()
}
