use pathlog::interrupt::Interrupt;
use pathlog::run::{self, Orchestrator};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // PATHLOG_LOG takes an EnvFilter directive, e.g. PATHLOG_LOG=debug
    if let Ok(filter) = EnvFilter::try_from_env("PATHLOG_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .without_time()
            .with_writer(io::stderr)
            .init();
    }

    let interrupt = match Interrupt::install() {
        Ok(interrupt) => interrupt,
        Err(e) => {
            return ExitCode::from(run::report(&Err(e), &mut io::stdout(), &mut io::stderr()));
        }
    };

    let mut orchestrator = Orchestrator::new(io::stdout().lock()).with_interrupt(interrupt);
    let result = orchestrator.run(std::env::args_os());

    ExitCode::from(run::report(&result, &mut io::stdout(), &mut io::stderr()))
}
