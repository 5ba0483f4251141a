// Devcap CLI
// Classify device nodes and print their synthesized metadata

use clap::Parser;
use devcap_core::{Device, Dispatcher, SUBSYSTEM_RULES};

/// Input device classifier for devd-style kernels
#[derive(Parser, Debug)]
#[command(name = "devcap")]
#[command(about = "Classify input device nodes and synthesize parent metadata", long_about = None)]
struct Args {
    /// Device paths to classify (e.g. /dev/input/event0, /dev/ukbd0)
    #[arg(value_name = "PATH")]
    paths: Vec<String>,

    /// Print the dispatch table and exit
    #[arg(long)]
    rules: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_rules() {
    for rule in SUBSYSTEM_RULES {
        println!(
            "{:28} {:8} {:12} skip_if_evdev={}",
            rule.pattern,
            rule.subsystem,
            format!("{:?}", rule.handler),
            rule.skip_if_evdev
        );
    }
}

fn classify_path(dispatcher: &Dispatcher, path: &str) {
    let mut device = Device::new(path);
    dispatcher.dispatch(&mut device);

    match dispatcher.subsystem_for_path(path) {
        Some(subsystem) => println!("{}: subsystem={}", path, subsystem),
        None => {
            println!("{}: not handled", path);
            return;
        }
    }
    for (key, value) in device.properties().iter() {
        println!("  {}={}", key, value);
    }
    if let Some(parent) = device.parent() {
        println!("  parent {}:", parent.sysname());
        for (key, value) in parent.properties().iter() {
            println!("    {}={}", key, value);
        }
        for (key, value) in parent.sysattrs().iter() {
            println!("    attr {}={}", key, value);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if args.rules {
        print_rules();
        return Ok(());
    }
    if args.paths.is_empty() {
        return Err("no device paths given (see --rules for handled nodes)".into());
    }

    let dispatcher = Dispatcher::with_kernel();
    for path in &args.paths {
        classify_path(&dispatcher, path);
    }
    Ok(())
}
