use std::process::ExitCode;

fn main() -> ExitCode {
    sitedesk_cli::run()
}
