use clap::Parser;

use treelight::args::DummyDaemonArgs;
use treelight::daemon;
use treelight::ledstrip::DummyStrip;

/// A debug version of lightingd that only logs the frames it would apply.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DummyDaemonArgs::parse();
    let listener = daemon::bind(&args.unix_socket)?;
    return daemon::serve(listener, DummyStrip::default());
}
