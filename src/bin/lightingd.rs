use clap::Parser;

use treelight::args::DaemonArgs;
use treelight::daemon;
use treelight::ledstrip::DeviceController;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DaemonArgs::parse();
    let hw = DeviceController::new(args.dma, args.channel, args.pin, args.leds_count)?;
    let listener = daemon::bind(&args.unix_socket)?;
    return daemon::serve(listener, hw);
}
