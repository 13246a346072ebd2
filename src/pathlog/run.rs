//! # Run Orchestrator
//!
//! Sequences one invocation:
//!
//! ```text
//! Start -> GuardHeld -> CommandResolved -> LogOpen -> Processing -> Done
//!   \__________\_____________\________________\__________\______-> Failed
//!                                                          \____-> Interrupted
//! ```
//!
//! - `Start -> GuardHeld`: take the execution guard ([`PathlogError::AlreadyRunning`]).
//! - `GuardHeld -> CommandResolved`: resolve the command token and parse the
//!   arguments ([`PathlogError::UnknownCommand`]). No token means usage is
//!   printed and nothing else happens.
//! - `CommandResolved -> LogOpen`: open the path log
//!   ([`PathlogError::StorageUnavailable`]).
//! - `LogOpen -> Processing`: run the command handler, then process each
//!   input path: build its [`PathInfo`], record it, print it.
//! - `Processing -> Done`: flush and close the log.
//!
//! The orchestrator never prints errors or exits. [`report`] turns its result
//! into the binary's exit status.
//! The guard handle is kept inside the orchestrator, so the lock is held until
//! the orchestrator is dropped.

use crate::cli::{self, Cli};
use crate::command::ResolvedArgs;
use crate::config::RunConfig;
use crate::error::{PathlogError, Result};
use crate::guard::{ExecutionGuard, GuardHandle};
use crate::interrupt::Interrupt;
use crate::path_log::PathLog;
use crate::pathinfo::PathInfo;
use crate::store::ShelfBackend;
use crate::store::fs::FileShelf;
use crate::tree::scan_tree;
use clap::Parser;
use colored::Colorize;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    GuardHeld,
    CommandResolved,
    LogOpen,
    Processing,
    Done,
    Failed,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No command was given; usage was printed.
    Usage,
    /// The command ran and `processed` paths were recorded.
    Completed { processed: usize },
}

pub struct Orchestrator<W: Write> {
    out: W,
    state: RunState,
    guard_resource: Option<PathBuf>,
    guard: Option<GuardHandle>,
    interrupt: Interrupt,
}

impl<W: Write> Orchestrator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: RunState::Start,
            guard_resource: None,
            guard: None,
            interrupt: Interrupt::new(),
        }
    }

    /// Contend on `resource` instead of the running executable.
    pub fn with_guard_resource(mut self, resource: impl Into<PathBuf>) -> Self {
        self.guard_resource = Some(resource.into());
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn guard(&self) -> Option<&GuardHandle> {
        self.guard.as_ref()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run a full invocation from a raw argument vector (program name first).
    pub fn run<I, T>(&mut self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let result = self.drive(args);
        self.settle(result)
    }

    /// Run from an already-built configuration, skipping argument handling.
    pub fn execute(&mut self, config: &RunConfig) -> Result<Outcome> {
        let result = self
            .hold_guard()
            .and_then(|_| {
                self.transition(RunState::CommandResolved);
                self.process_with(config, FileShelf::new(&config.database))
            });
        self.settle(result)
    }

    fn drive<I, T>(&mut self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.hold_guard()?;

        let args = match cli::registry().resolve_args(args) {
            ResolvedArgs::Command { args, .. } | ResolvedArgs::NoCommand(args) => args,
            ResolvedArgs::Unresolved(token) => return Err(PathlogError::UnknownCommand(token)),
        };
        let Some(config) = Cli::try_parse_from(args)?.into_config() else {
            return self.usage();
        };
        self.transition(RunState::CommandResolved);

        self.process_with(&config, FileShelf::new(&config.database))
    }

    fn hold_guard(&mut self) -> Result<()> {
        if self.guard.is_none() {
            let handle = match &self.guard_resource {
                Some(resource) => ExecutionGuard::acquire_at(resource)?,
                None => ExecutionGuard::acquire()?,
            };
            self.guard = Some(handle);
        }
        self.transition(RunState::GuardHeld);
        Ok(())
    }

    fn usage(&mut self) -> Result<Outcome> {
        write!(self.out, "{}", cli::usage())?;
        self.transition(RunState::Done);
        Ok(Outcome::Usage)
    }

    /// The log-open, processing and flush stages against any backend.
    pub(crate) fn process_with<B: ShelfBackend>(
        &mut self,
        config: &RunConfig,
        backend: B,
    ) -> Result<Outcome> {
        let mut log = PathLog::open(backend)?;
        self.transition(RunState::LogOpen);

        self.transition(RunState::Processing);
        if config.verbose {
            writeln!(self.out, "verbose mode enabled, will display abspath")?;
        }
        tracing::debug!(command = config.command.name(), "running handler");
        config.command.run(&log, &mut self.out)?;

        for path in &config.paths {
            self.interrupt.check()?;
            if config.recursive && Path::new(path).is_dir() {
                for entry in scan_tree(path, config.scan_options()) {
                    self.interrupt.check()?;
                    let entry = entry?;
                    tracing::debug!(
                        path = %entry.path().display(),
                        depth = entry.depth(),
                        symlink = entry.is_symlink(),
                        "expanded entry"
                    );
                    self.worker(&entry.path().to_string_lossy(), config.verbose, &mut log)?;
                }
            } else {
                self.worker(path, config.verbose, &mut log)?;
            }
        }

        let processed = log.recorded().len();
        log.close()?;
        self.transition(RunState::Done);
        Ok(Outcome::Completed { processed })
    }

    fn worker<B: ShelfBackend>(
        &mut self,
        path: &str,
        verbose: bool,
        log: &mut PathLog<B>,
    ) -> Result<()> {
        let info = PathInfo::parse(path);
        if verbose {
            writeln!(self.out, "{}", info)?;
        }
        log.record(info.abspath.clone());
        writeln!(self.out, "{}", info.display_line(verbose))?;
        Ok(())
    }

    fn settle(&mut self, result: Result<Outcome>) -> Result<Outcome> {
        match &result {
            Ok(_) => {}
            Err(PathlogError::Interrupted) => self.transition(RunState::Interrupted),
            Err(_) => self.transition(RunState::Failed),
        }
        result
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }
}

/// Prints the terminal line for `result` and returns the process exit code.
///
/// - success: 0, nothing printed
/// - interrupted: `Ctrl+C` on `out`, 0
/// - argument errors: clap prints its own message; its code (2 for grammar errors)
/// - anything else: a red `Error: ...` line on `err`, 1
pub fn report<O: Write, E: Write>(result: &Result<Outcome>, out: &mut O, err: &mut E) -> u8 {
    match result {
        Ok(_) => 0,
        Err(PathlogError::Interrupted) => {
            let _ = writeln!(out, "Ctrl+C");
            0
        }
        Err(PathlogError::Usage(e)) => {
            let _ = e.print();
            u8::try_from(e.exit_code()).unwrap_or(1)
        }
        Err(e) => {
            let _ = writeln!(err, "{}", format!("Error: {e}").red());
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Command;
    use crate::path_log::PATHS_KEY;
    use crate::store::memory::MemoryShelf;
    use serde_json::json;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        resource: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let resource = dir.path().join("pathlog-bin");
            fs::write(&resource, b"bin").unwrap();
            Self { dir, resource }
        }

        fn db(&self) -> PathBuf {
            self.dir.path().join("data.db")
        }

        fn orchestrator(&self) -> Orchestrator<Vec<u8>> {
            Orchestrator::new(Vec::new()).with_guard_resource(&self.resource)
        }

        fn run(&self, args: &[&str]) -> (Result<Outcome>, RunState, String) {
            let mut orchestrator = self.orchestrator();
            let result = orchestrator.run(args.iter().copied());
            let state = orchestrator.state();
            let out = String::from_utf8(orchestrator.into_output()).unwrap();
            (result, state, out)
        }

        fn recorded(&self) -> Vec<String> {
            let log = PathLog::open(FileShelf::new(self.db())).unwrap();
            log.snapshot().to_vec()
        }
    }

    #[test]
    fn test_hello_processes_paths() {
        let fx = Fixture::new();
        let db = fx.db();
        let (result, state, out) = fx.run(&[
            "pathlog",
            "--database",
            db.to_str().unwrap(),
            "hello",
            "--name",
            "Ada",
            "/tmp/x/y.txt",
            "/srv/z.log",
        ]);

        assert_eq!(result.unwrap(), Outcome::Completed { processed: 2 });
        assert_eq!(state, RunState::Done);
        assert_eq!(out, "Hello, Ada!\ny.txt\nz.log\n");
        assert_eq!(fx.recorded(), vec!["/tmp/x/y.txt", "/srv/z.log"]);
    }

    #[test]
    fn test_verbose_prints_abspath_and_diagnostics() {
        let fx = Fixture::new();
        let db = fx.db();
        let (result, _, out) = fx.run(&[
            "pathlog",
            "-v",
            "-d",
            db.to_str().unwrap(),
            "bye",
            "/tmp/x/y.txt",
        ]);

        result.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "verbose mode enabled, will display abspath");
        assert_eq!(lines[1], "Goodbye!");
        assert!(lines[2].starts_with("PathInfo(ok=true"));
        assert_eq!(lines[3], "/tmp/x/y.txt");
    }

    #[test]
    fn test_prefix_selects_command() {
        let fx = Fixture::new();
        let db = fx.db();
        let (result, _, out) = fx.run(&["pathlog", "-d", db.to_str().unwrap(), "he"]);
        result.unwrap();
        assert_eq!(out, "Hello, world!\n");
    }

    #[test]
    fn test_no_command_prints_usage_and_skips_log() {
        let fx = Fixture::new();
        let db = fx.db();
        let (result, state, out) = fx.run(&["pathlog", "-d", db.to_str().unwrap()]);

        assert_eq!(result.unwrap(), Outcome::Usage);
        assert_eq!(state, RunState::Done);
        assert!(out.contains("Usage:"));
        assert!(!db.exists());
    }

    #[test]
    fn test_unknown_command_fails_before_log_opens() {
        let fx = Fixture::new();
        let db = fx.db();
        let (result, state, _) = fx.run(&["pathlog", "-d", db.to_str().unwrap(), "zap", "a"]);

        match result {
            Err(PathlogError::UnknownCommand(token)) => assert_eq!(token, "zap"),
            other => panic!("expected UnknownCommand, got {other:?}"),
        }
        assert_eq!(state, RunState::Failed);
        assert!(!db.exists());
    }

    #[test]
    fn test_second_orchestrator_is_already_running() {
        let fx = Fixture::new();
        let mut first = fx.orchestrator();
        first.hold_guard().unwrap();

        let (result, state, out) = fx.run(&["pathlog", "bye"]);
        assert!(matches!(result, Err(PathlogError::AlreadyRunning(_))));
        assert_eq!(state, RunState::Failed);
        assert!(out.is_empty());
    }

    #[test]
    fn test_guard_is_held_for_the_whole_run() {
        let fx = Fixture::new();
        let db = fx.db();
        let mut orchestrator = fx.orchestrator();
        orchestrator
            .run(["pathlog", "-d", db.to_str().unwrap(), "bye", "a"])
            .unwrap();

        assert!(orchestrator.guard().is_some());
        assert!(ExecutionGuard::acquire_at(&fx.resource).is_err());

        drop(orchestrator);
        assert!(ExecutionGuard::acquire_at(&fx.resource).is_ok());
    }

    #[test]
    fn test_runs_accumulate_in_the_log() {
        let fx = Fixture::new();
        let db = fx.db();
        let db = db.to_str().unwrap();
        fx.run(&["pathlog", "-d", db, "bye", "/a"]).0.unwrap();
        fx.run(&["pathlog", "-d", db, "bye", "/b", "/a"]).0.unwrap();

        assert_eq!(fx.recorded(), vec!["/a", "/b", "/a"]);

        let (_, _, out) = fx.run(&["pathlog", "-d", db, "seen"]);
        assert_eq!(out, "/a\n/b\n/a\n");
    }

    #[test]
    fn test_storage_unavailable() {
        let fx = Fixture::new();
        let db = fx.db();
        fs::write(&db, "not json").unwrap();

        let (result, state, _) = fx.run(&["pathlog", "-d", db.to_str().unwrap(), "bye", "a"]);
        assert!(matches!(result, Err(PathlogError::StorageUnavailable { .. })));
        assert_eq!(state, RunState::Failed);
        assert_eq!(fs::read_to_string(&db).unwrap(), "not json");
    }

    #[test]
    fn test_recursive_expands_directories() {
        let fx = Fixture::new();
        let tree = fx.dir.path().join("tree");
        fs::create_dir_all(tree.join("sub")).unwrap();
        fs::write(tree.join("one.txt"), "1").unwrap();
        fs::write(tree.join("sub/two.txt"), "2").unwrap();

        let config = RunConfig::new(Command::Bye)
            .with_paths([tree.to_str().unwrap(), "/elsewhere/plain.txt"])
            .with_database(fx.db())
            .recursive(true, false);
        let mut orchestrator = fx.orchestrator();
        let outcome = orchestrator.execute(&config).unwrap();
        assert_eq!(outcome, Outcome::Completed { processed: 3 });

        let out = String::from_utf8(orchestrator.into_output()).unwrap();
        let mut names: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(names.pop(), Some("plain.txt"));
        names.sort();
        assert_eq!(names, vec!["one.txt", "two.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_recorded_when_following_links() {
        let fx = Fixture::new();
        let tree = fx.dir.path().join("tree");
        fs::create_dir_all(&tree).unwrap();
        fs::write(tree.join("one.txt"), "1").unwrap();
        std::os::unix::fs::symlink(tree.join("nowhere"), tree.join("dangling")).unwrap();

        let config = RunConfig::new(Command::Bye)
            .with_paths([tree.to_str().unwrap(), "/elsewhere/plain.txt"])
            .with_database(fx.db())
            .recursive(true, true);
        let mut orchestrator = fx.orchestrator();
        let outcome = orchestrator.execute(&config).unwrap();
        assert_eq!(outcome, Outcome::Completed { processed: 3 });
        assert_eq!(orchestrator.state(), RunState::Done);

        let out = String::from_utf8(orchestrator.into_output()).unwrap();
        let mut names: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(names.pop(), Some("plain.txt"));
        names.sort();
        assert_eq!(names, vec!["dangling", "one.txt"]);

        let dangling = tree.join("dangling").to_string_lossy().into_owned();
        assert!(fx.recorded().contains(&dangling));
    }

    #[test]
    fn test_directory_is_a_plain_path_without_recursive() {
        let fx = Fixture::new();
        let config = RunConfig::new(Command::Bye)
            .with_paths([fx.dir.path().to_str().unwrap()])
            .with_database(fx.db());
        let mut orchestrator = fx.orchestrator();
        assert_eq!(
            orchestrator.execute(&config).unwrap(),
            Outcome::Completed { processed: 1 }
        );
    }

    /// Output sink that raises the interrupt flag after the first path line.
    struct TripWire {
        buf: Vec<u8>,
        interrupt: Interrupt,
        lines: usize,
        trip_after: usize,
    }

    impl Write for TripWire {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.lines += data.iter().filter(|b| **b == b'\n').count();
            if self.lines >= self.trip_after {
                self.interrupt.trigger();
            }
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_interrupt_stops_processing_and_keeps_log_consistent() {
        let fx = Fixture::new();
        let interrupt = Interrupt::new();
        let sink = TripWire {
            buf: Vec::new(),
            interrupt: interrupt.clone(),
            lines: 0,
            // "Goodbye!" then the first path
            trip_after: 2,
        };
        let mut orchestrator = Orchestrator::new(sink)
            .with_guard_resource(&fx.resource)
            .with_interrupt(interrupt);

        let config = RunConfig::new(Command::Bye)
            .with_paths(["/p/one", "/p/two", "/p/three"])
            .with_database(fx.db());
        let result = orchestrator.execute(&config);

        assert!(matches!(result, Err(PathlogError::Interrupted)));
        assert_eq!(orchestrator.state(), RunState::Interrupted);
        assert_eq!(fx.recorded(), vec!["/p/one"]);
    }

    #[test]
    fn test_process_with_memory_backend() {
        let fx = Fixture::new();
        let backend = MemoryShelf::new();
        let config = RunConfig::new(Command::Bye).with_paths(["/m/a", "/m/b"]);

        let mut orchestrator = fx.orchestrator();
        orchestrator.hold_guard().unwrap();
        orchestrator.process_with(&config, backend.clone()).unwrap();

        assert_eq!(backend.snapshot()[PATHS_KEY], json!(["/m/a", "/m/b"]));
    }

    fn reported(result: Result<Outcome>) -> (u8, String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = report(&result, &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_report_interrupt_exits_cleanly() {
        let (code, out, err) = reported(Err(PathlogError::Interrupted));
        assert_eq!(code, 0);
        assert_eq!(out, "Ctrl+C\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_report_fatal_error_on_stderr() {
        let (code, out, err) =
            reported(Err(PathlogError::UnknownCommand("frobnicate".to_string())));
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(err.contains("Error: "));
        assert!(err.contains("frobnicate"));
    }

    #[test]
    fn test_report_success_prints_nothing() {
        let (code, out, err) = reported(Ok(Outcome::Completed { processed: 3 }));
        assert_eq!(code, 0);
        assert!(out.is_empty() && err.is_empty());
    }

    #[test]
    fn test_report_usage_error_keeps_clap_exit_code() {
        let parse = Cli::try_parse_from(["pathlog", "hello", "--bogus"]);
        let (code, out, err) = reported(Err(PathlogError::Usage(parse.unwrap_err())));
        assert_eq!(code, 2);
        assert!(out.is_empty() && err.is_empty());
    }

    #[test]
    fn test_interrupted_run_reports_ctrl_c() {
        let fx = Fixture::new();
        let config = RunConfig::new(Command::Bye)
            .with_paths(["/a/one.txt", "/a/two.txt"])
            .with_database(fx.db());
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let mut orchestrator = fx.orchestrator().with_interrupt(interrupt);
        let result = orchestrator.execute(&config);
        assert_eq!(orchestrator.state(), RunState::Interrupted);

        let (code, out, err) = reported(result);
        assert_eq!((code, out.as_str(), err.as_str()), (0, "Ctrl+C\n", ""));
    }
}
