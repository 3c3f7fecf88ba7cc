use std::io::IsTerminal;
use std::io::Write;

use anyhow::bail;
use clap::Parser;

use treelight::args::ControlArgs;
use treelight::args::InputMode;
use treelight::args::Output;
use treelight::config::ConfigFile;
use treelight::config::Settings;
use treelight::daemon::SocketSink;
use treelight::keys::Interrupt;
use treelight::keys::KeySource;
use treelight::ledstrip::DummyStrip;
use treelight::line_input::LineKeys;
use treelight::terminal::status_line;
use treelight::terminal::RawTerminal;
use treelight::tree::FrameSink;
use treelight::Controller;
use treelight::Exit;
use treelight::Tree;

fn init_logging(raw: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if raw {
        // Raw mode doesn't turn "\n" into "\r\n" for us.
        builder.format(|buf, record| {
            write!(buf, "[{} {}] {}\r\n", record.level(), record.target(), record.args())
        });
    }
    builder.init();
}

fn open_output(output: Output, settings: &Settings) -> anyhow::Result<Box<dyn FrameSink>> {
    match output {
        Output::Dummy => Ok(Box::new(DummyStrip::default())),
        Output::Daemon => Ok(Box::new(SocketSink::connect(&settings.daemon_socket)?)),
        #[cfg(feature = "ws281x")]
        Output::Strip => Ok(Box::new(treelight::ledstrip::DeviceController::new(
            settings.dma,
            settings.channel,
            settings.pin,
            settings.leds,
        )?)),
        #[cfg(not(feature = "ws281x"))]
        Output::Strip => bail!("built without ws281x support, use --output daemon"),
    }
}

fn main() -> anyhow::Result<()> {
    let args = ControlArgs::parse();
    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let settings = Settings::resolve(&args, file)?;
    let raw = match args.input {
        InputMode::Auto => std::io::stdin().is_terminal(),
        InputMode::Raw => true,
        InputMode::Line => false,
    };
    init_logging(raw);

    let interrupt = Interrupt::install()?;
    let tree = Tree::new(open_output(args.output, &settings)?, settings.leds);
    let keys: Box<dyn KeySource> = if raw {
        Box::new(RawTerminal::enter(interrupt)?)
    } else {
        Box::new(LineKeys::stdin(interrupt))
    };

    if raw {
        status_line("Press 0-9 (or 1 then 0 for 10) to change brightness, q to quit.")?;
    } else {
        status_line("Enter brightness (0-10), or 'q' to quit.")?;
    }
    let exit = Controller::new(keys, tree, settings.lookahead)
        .initial_level(Some(settings.initial_level))
        .on_applied(|level| {
            let brightness = f32::from(level.brightness());
            let status = format!("Current brightness: {} -> {:.2}", level, brightness);
            if let Err(err) = status_line(&status) {
                log::debug!("failed to show status: {}", err);
            }
        })
        .run();

    log::info!("exiting: {:?}", exit);
    if exit == Exit::InputFailed {
        bail!("failed to read input");
    }
    return Ok(());
}
