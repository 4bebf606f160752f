use expense_core::cli::run_cli;

fn main() {
    // tracing is initialized by the shell once the log filter is read from config
    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
