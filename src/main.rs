use clap::Parser;
use todos::cli::commands::Cli;
use todos::cli::handlers;
use todos::io::logging;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => std::process::exit(handlers::report_parse_error(e)),
    };
    logging::init_cli_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
