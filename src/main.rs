use camfx::cli::{self, Args, Command};
use clap::Parser;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config_path = args.config.as_deref();

    let result = match args.command {
        Command::Run(run) => cli::run(run, config_path),
        Command::Histogram { image, json } => cli::histogram(&image, json),
        Command::List => {
            cli::list();
            Ok(())
        }
        Command::Config { action } => cli::handle_config_action(action, config_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
