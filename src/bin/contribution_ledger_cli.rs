use contribution_ledger::{cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        contribution_ledger::cli::output::error(&err);
        std::process::exit(1);
    }
}
