use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Context;
use serde::Deserialize;

use crate::args::ControlArgs;
use crate::daemon::MAX_FRAME;
use crate::interpreter::Level;
use crate::interpreter::LOOKAHEAD;
use crate::tree::TREE_LEDS;

/// Defaults read from a JSON file, e.g.
///
/// ```json
/// { "daemon_socket": "/run/lightingd.sock", "leds": 25, "initial_level": 3 }
/// ```
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub daemon_socket: Option<PathBuf>,
    pub leds: Option<usize>,
    pub lookahead_ms: Option<u64>,
    pub initial_level: Option<u8>,
    pub dma: Option<i32>,
    pub channel: Option<usize>,
    pub pin: Option<i32>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<ConfigFile> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return ConfigFile::parse(&text)
            .with_context(|| format!("invalid config file {}", path.display()));
    }

    pub fn parse(text: &str) -> anyhow::Result<ConfigFile> {
        return Ok(serde_json::from_str(text)?);
    }
}

/// Everything the controller needs, after merging the command line over
/// the config file over the built-in defaults.
#[derive(Debug, PartialEq)]
pub struct Settings {
    pub daemon_socket: PathBuf,
    pub leds: usize,
    pub lookahead: Duration,
    pub initial_level: Level,
    pub dma: i32,
    pub channel: usize,
    pub pin: i32,
}

pub const DEFAULT_SOCKET: &str = "/run/lightingd.sock";

/// Where the tree starts: white at half brightness.
pub const DEFAULT_LEVEL: u8 = 5;

impl Settings {
    pub fn resolve(args: &ControlArgs, file: ConfigFile) -> anyhow::Result<Settings> {
        let initial = args.initial_level.or(file.initial_level).unwrap_or(DEFAULT_LEVEL);
        let initial_level = Level::new(initial)
            .ok_or_else(|| anyhow!("initial level {} is not between 0 and 10", initial))?;
        let leds = args.leds.or(file.leds).unwrap_or(TREE_LEDS);
        if leds > MAX_FRAME {
            bail!("{} leds is more than the supported {}", leds, MAX_FRAME);
        }
        let lookahead = match args.lookahead_ms.or(file.lookahead_ms) {
            Some(ms) => Duration::from_millis(ms),
            None => LOOKAHEAD,
        };
        return Ok(Settings {
            daemon_socket: args
                .daemon_socket
                .clone()
                .or(file.daemon_socket)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET)),
            leds: leds,
            lookahead: lookahead,
            initial_level: initial_level,
            dma: args.dma.or(file.dma).unwrap_or(5),
            channel: args.channel.or(file.channel).unwrap_or(0),
            pin: args.pin.or(file.pin).unwrap_or(18),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> ControlArgs {
        let mut argv = vec!["treelight"];
        argv.extend_from_slice(extra);
        return ControlArgs::try_parse_from(argv).unwrap();
    }

    #[test]
    fn builtin_defaults() {
        let settings = Settings::resolve(&args(&[]), ConfigFile::default()).unwrap();
        assert_eq!(settings.daemon_socket, PathBuf::from(DEFAULT_SOCKET));
        assert_eq!(settings.leds, TREE_LEDS);
        assert_eq!(settings.lookahead, LOOKAHEAD);
        assert_eq!(Some(settings.initial_level), Level::new(DEFAULT_LEVEL));
        assert_eq!((settings.dma, settings.channel, settings.pin), (5, 0, 18));
    }

    #[test]
    fn command_line_beats_file() {
        let file = ConfigFile::parse(r#"{"leds": 40, "lookahead_ms": 300, "pin": 12}"#).unwrap();
        let settings = Settings::resolve(&args(&["--leds", "60"]), file).unwrap();
        assert_eq!(settings.leds, 60);
        assert_eq!(settings.lookahead, Duration::from_millis(300));
        assert_eq!(settings.pin, 12);
    }

    #[test]
    fn bad_initial_level() {
        let result = Settings::resolve(&args(&["--initial-level", "11"]), ConfigFile::default());
        assert!(result.is_err());
    }

    #[test]
    fn too_many_leds_in_the_file() {
        let file = ConfigFile::parse(r#"{"leds": 2000}"#).unwrap();
        assert!(Settings::resolve(&args(&[]), file).is_err());
        let file = ConfigFile::parse(r#"{"leds": 1024}"#).unwrap();
        assert_eq!(Settings::resolve(&args(&[]), file).unwrap().leds, MAX_FRAME);
    }

    #[test]
    fn unknown_keys_are_errors() {
        assert!(ConfigFile::parse(r#"{"brightness": 3}"#).is_err());
        assert_eq!(ConfigFile::parse("{}").unwrap(), ConfigFile::default());
    }
}
