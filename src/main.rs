mod cli;

fn main() -> std::process::ExitCode {
    let code = match cli::run() {
        Ok(()) => cli::ExitCode::Success,
        Err(err) => {
            eprintln!("Error: {err:#}");
            cli::ExitCode::for_error(&err)
        }
    };
    std::process::ExitCode::from(code as u8)
}
