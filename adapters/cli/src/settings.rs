//! Command-line flags and the optional TOML file they override.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use marble_lines_core::Color;
use marble_lines_system_supply::{Config as SupplyConfig, Palette, RandomSupply, DEFAULT_BALLS_PER_TURN};
use marble_lines_world::{Config as BoardConfig, World};
use serde::Deserialize;

/// Play Marble Lines in the terminal.
#[derive(Debug, Parser)]
#[command(name = "marble-lines", version)]
#[command(about = "Line up five balls of one color to clear them", long_about = None)]
pub(crate) struct Args {
    /// Number of board columns.
    #[arg(long)]
    pub(crate) width: Option<u32>,

    /// Number of board rows.
    #[arg(long)]
    pub(crate) height: Option<u32>,

    /// Balls dropped on the board after every move.
    #[arg(long)]
    pub(crate) balls_per_turn: Option<usize>,

    /// Seed for ball colors and landing cells; random when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Drop balls of a single color only.
    #[arg(long, value_name = "COLOR")]
    pub(crate) fixed_color: Option<Color>,

    /// TOML file with `[board]` and `[supply]` tables.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    board: BoardSection,
    supply: SupplySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BoardSection {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SupplySection {
    balls_per_turn: Option<usize>,
    seed: Option<u64>,
    fixed_color: Option<String>,
}

/// Fully resolved game parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) board: BoardConfig,
    pub(crate) supply: SupplyConfig,
}

impl Settings {
    /// Loads the configuration file, if any, and applies the flags on top.
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => load_file(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Builds a world backed by a seeded random supply.
    pub(crate) fn build_world(&self) -> World {
        World::new(self.board, Box::new(RandomSupply::new(self.supply)))
    }

    fn merge(args: &Args, file: FileConfig) -> Result<Self> {
        let defaults = BoardConfig::default();
        let width = args.width.or(file.board.width).unwrap_or(defaults.width());
        let height = args.height.or(file.board.height).unwrap_or(defaults.height());
        if width == 0 || height == 0 {
            bail!("board dimensions must be positive, got {width}x{height}");
        }

        let balls_per_turn = args
            .balls_per_turn
            .or(file.supply.balls_per_turn)
            .unwrap_or(DEFAULT_BALLS_PER_TURN);
        if balls_per_turn == 0 {
            bail!("at least one ball must be dropped per turn");
        }

        let fixed_color = match args.fixed_color {
            Some(color) => Some(color),
            None => file
                .supply
                .fixed_color
                .as_deref()
                .map(str::parse::<Color>)
                .transpose()
                .context("invalid supply.fixed_color in config file")?,
        };
        let palette = fixed_color.map_or(Palette::Uniform, Palette::Fixed);
        let seed = args.seed.or(file.supply.seed).unwrap_or_else(rand::random);

        Ok(Self {
            board: BoardConfig::new(width, height),
            supply: SupplyConfig::new(balls_per_turn, seed).with_palette(palette),
        })
    }
}

fn load_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_file(&contents)
}

fn parse_file(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("failed to parse config toml contents")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("marble-lines").chain(flags.iter().copied()))
            .expect("flags parse")
    }

    #[test]
    fn defaults_match_the_classic_board() {
        let settings = Settings::merge(&args(&["--seed", "3"]), FileConfig::default())
            .expect("defaults are valid");

        assert_eq!(settings.board, BoardConfig::new(9, 9));
        assert_eq!(settings.supply, SupplyConfig::new(3, 3));
    }

    #[test]
    fn file_values_fill_in_missing_flags() {
        let file = parse_file(
            r#"
            [board]
            width = 6
            height = 7

            [supply]
            balls_per_turn = 2
            seed = 11
            fixed_color = "Blue"
            "#,
        )
        .expect("config parses");
        let settings = Settings::merge(&args(&["--height", "8"]), file).expect("valid");

        assert_eq!(settings.board, BoardConfig::new(6, 8));
        assert_eq!(
            settings.supply,
            SupplyConfig::new(2, 11).with_palette(Palette::Fixed(Color::Blue))
        );
    }

    #[test]
    fn flags_override_the_file() {
        let file = parse_file("[supply]\nseed = 1\nfixed_color = \"red\"\n").expect("parses");
        let settings = Settings::merge(
            &args(&["--seed", "99", "--fixed-color", "magenta", "--balls-per-turn", "4"]),
            file,
        )
        .expect("valid");

        assert_eq!(
            settings.supply,
            SupplyConfig::new(4, 99).with_palette(Palette::Fixed(Color::Magenta))
        );
    }

    #[test]
    fn empty_boards_are_rejected() {
        let error = Settings::merge(&args(&["--width", "0"]), FileConfig::default())
            .expect_err("zero width is invalid");
        assert!(error.to_string().contains("must be positive"));

        assert!(Settings::merge(&args(&["--balls-per-turn", "0"]), FileConfig::default()).is_err());
    }

    #[test]
    fn unknown_colors_are_reported() {
        let file = parse_file("[supply]\nfixed_color = \"purple\"\n").expect("parses");
        let error = Settings::merge(&args(&[]), file).expect_err("purple is not a ball color");
        assert!(format!("{error:#}").contains("purple"));

        assert!(Args::try_parse_from(["marble-lines", "--fixed-color", "purple"]).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_file("[board]\ndepth = 3\n").is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = load_file(Path::new("does/not/exist.toml")).expect_err("file is missing");
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
