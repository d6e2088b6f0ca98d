//! Allot CLI entry point

fn main() {
    if let Err(e) = allot_cli::run() {
        allot_cli::print_error(&e.to_string());
        std::process::exit(1);
    }
}
