#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = chatreplay::run_from_env() {
        tracing::error!(error = %error, exit_code = error.exit_code(), "chatreplay failed");
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
