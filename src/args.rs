use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::daemon::MAX_FRAME;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Raw mode if stdin is a terminal, lines otherwise.
    Auto,
    Raw,
    Line,
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<InputMode, String> {
        match s {
            "auto" => Ok(InputMode::Auto),
            "raw" => Ok(InputMode::Raw),
            "line" => Ok(InputMode::Line),
            _ => Err(format!("unknown input mode {}, expected auto, raw or line", s)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// Only log the frames.
    Dummy,
    /// Send frames to a running lightingd.
    Daemon,
    /// Drive the LEDs from this process.
    Strip,
}

impl FromStr for Output {
    type Err = String;

    fn from_str(s: &str) -> Result<Output, String> {
        match s {
            "dummy" => Ok(Output::Dummy),
            "daemon" => Ok(Output::Daemon),
            "strip" => Ok(Output::Strip),
            _ => Err(format!("unknown output {}, expected dummy, daemon or strip", s)),
        }
    }
}

/// LED counts have to fit into one daemon frame.
pub fn parse_led_count(s: &str) -> Result<usize, String> {
    let leds = s.parse::<usize>().map_err(|e| e.to_string())?;
    if leds > MAX_FRAME {
        return Err(format!("at most {} leds are supported", MAX_FRAME));
    }
    return Ok(leds);
}

/// Set the brightness of an RGB Xmas tree from the keyboard.
///
/// Press 0-9 for a brightness level (0 turns the tree off), 1 then 0
/// quickly for full brightness, q to quit.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct ControlArgs {
    /// Where key presses are read from: auto, raw or line.
    #[clap(short, long, default_value = "auto")]
    pub input: InputMode,

    /// Where frames go: dummy, daemon or strip.
    #[clap(short, long, default_value = "daemon")]
    pub output: Output,

    /// JSON file with default settings.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Path to the listening socket of lightingd.
    #[clap(short, long)]
    pub daemon_socket: Option<PathBuf>,

    /// How many LEDs the tree has.
    #[clap(short, long, parse(try_from_str = parse_led_count))]
    pub leds: Option<usize>,

    /// How long a 1 waits for a following 0, in milliseconds.
    #[clap(long)]
    pub lookahead_ms: Option<u64>,

    /// Brightness level (0-10) to start with.
    #[clap(long)]
    pub initial_level: Option<u8>,

    /// The DMA number, for the strip output.
    #[clap(long)]
    pub dma: Option<i32>,

    /// The PWM channel, for the strip output. Usually 0 or 1.
    #[clap(long)]
    pub channel: Option<usize>,

    /// The pin the LEDs are attached to, for the strip output.
    #[clap(long)]
    pub pin: Option<i32>,
}

/// Owns the LED hardware and accepts frames over a unix socket.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct DaemonArgs {
    /// Path to the listening socket of the daemon.
    #[clap(short, long)]
    pub unix_socket: PathBuf,

    /// The PWM channel to which the LED string is connected. Usually 0 or 1.
    #[clap(short, long, default_value = "0")]
    pub channel: usize,

    /// The DMA offset number.
    #[clap(short, long, default_value = "5")]
    pub dma: i32,

    /// The pin to which the LED string is attached
    #[clap(short, long, default_value = "18")]
    pub pin: i32,

    /// How many LEDs the string contains.
    #[clap(short, long, default_value = "25", parse(try_from_str = parse_led_count))]
    pub leds_count: usize,
}

/// Accepts frames over a unix socket and logs them instead of lighting
/// anything up.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct DummyDaemonArgs {
    /// Path to the listening socket of the daemon.
    #[clap(short, long)]
    pub unix_socket: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_defaults() {
        let args = ControlArgs::try_parse_from(["treelight"]).unwrap();
        assert_eq!(args.input, InputMode::Auto);
        assert_eq!(args.output, Output::Daemon);
        assert_eq!(args.leds, None);
    }

    #[test]
    fn control_options() {
        let args = ControlArgs::try_parse_from([
            "treelight",
            "--input",
            "line",
            "--output",
            "dummy",
            "--leds",
            "50",
            "--lookahead-ms",
            "400",
        ])
        .unwrap();
        assert_eq!(args.input, InputMode::Line);
        assert_eq!(args.output, Output::Dummy);
        assert_eq!(args.leds, Some(50));
        assert_eq!(args.lookahead_ms, Some(400));
    }

    #[test]
    fn unknown_modes_are_rejected() {
        assert!(ControlArgs::try_parse_from(["treelight", "--input", "curses"]).is_err());
        assert!(ControlArgs::try_parse_from(["treelight", "--output", "hdmi"]).is_err());
    }

    #[test]
    fn too_many_leds_are_rejected() {
        assert!(ControlArgs::try_parse_from(["treelight", "--leds", "2000"]).is_err());
        let args = ["lightingd", "-u", "/tmp/tree.sock", "--leds-count", "2000"];
        assert!(DaemonArgs::try_parse_from(args).is_err());
        assert_eq!(parse_led_count("1024"), Ok(MAX_FRAME));
    }

    #[test]
    fn daemon_needs_a_socket() {
        assert!(DaemonArgs::try_parse_from(["lightingd"]).is_err());
        let args = DaemonArgs::try_parse_from(["lightingd", "-u", "/tmp/tree.sock"]).unwrap();
        assert_eq!(args.pin, 18);
        assert_eq!(args.leds_count, 25);
    }
}
