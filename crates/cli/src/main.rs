//! semtest CLI entry point.

fn main() {
    if let Err(e) = semtest_cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
