use doit::Interpreter;
use doit::config::{Config, Mode};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config: Config = argh::from_env();
    if let Err(e) = doit::logging::init(config.log_level) {
        eprintln!("doit: {e}");
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("doit: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let mut sh = Interpreter::default().with_prompt(config.prompt.as_str());
    match config.mode() {
        Mode::OneShot(argv) => {
            let code = sh.run(argv)?;
            log::debug!("{} exited with {}", argv[0], code);
        }
        Mode::Interactive => sh.repl()?,
    }
    Ok(())
}
