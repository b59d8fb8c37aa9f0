//! Signal driven shutdown.
//!
//! Handlers only store into atomics. A [`Watcher`] polls them on a fixed
//! interval and performs the drain outside signal context. Fault signals
//! are the exception: they write a fixed diagnostic and abort.
//!
//! `SIGCONT` only sets a flag as well, so its configuration dump appears
//! on the watcher's next tick, up to one interval later, not inside the
//! handler. Formatting the dump allocates, which is not allowed in signal
//! context.

use crate::config::ServiceConfig;
use crate::engine::topology::Topology;
use chrono::Local;
use nix::libc::{c_int, STDERR_FILENO};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::os::fd::BorrowedFd;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Draining,
    Terminated,
}

/// Flags written from signal context.
#[derive(Debug, Default)]
pub struct SignalFlags {
    pending: AtomicI32,
    dump: AtomicBool,
}

static GLOBAL_FLAGS: SignalFlags = SignalFlags::new();

impl SignalFlags {
    pub const fn new() -> Self {
        Self {
            pending: AtomicI32::new(0),
            dump: AtomicBool::new(false),
        }
    }

    /// The flags the installed handlers write to.
    pub fn global() -> &'static SignalFlags {
        &GLOBAL_FLAGS
    }

    /// Records a termination request. Async-signal-safe.
    pub fn raise(&self, signal: c_int) {
        self.pending.store(signal, Ordering::SeqCst);
    }

    /// Requests a configuration dump. Async-signal-safe.
    pub fn request_dump(&self) {
        self.dump.store(true, Ordering::SeqCst);
    }

    pub fn take_signal(&self) -> Option<c_int> {
        match self.pending.swap(0, Ordering::SeqCst) {
            0 => None,
            signal => Some(signal),
        }
    }

    pub fn take_dump(&self) -> bool {
        self.dump.swap(false, Ordering::SeqCst)
    }
}

extern "C" fn on_termination(signal: c_int) {
    GLOBAL_FLAGS.raise(signal);
}

extern "C" fn on_continue(_signal: c_int) {
    GLOBAL_FLAGS.request_dump();
}

extern "C" fn on_fault(signal: c_int) {
    let message: &[u8] = if signal == Signal::SIGSEGV as c_int {
        b"[engine] caught signal (SIGSEGV)\n"
    } else if signal == Signal::SIGFPE as c_int {
        b"[engine] caught signal (SIGFPE)\n"
    } else {
        b"[engine] caught fatal signal\n"
    };

    // SAFETY: stderr stays open for the lifetime of the process.
    let stderr = unsafe { BorrowedFd::borrow_raw(STDERR_FILENO) };
    let _ = nix::unistd::write(stderr, message);
    std::process::abort();
}

/// Installs the process signal handlers.
pub fn install_handlers() -> Result<(), nix::Error> {
    let termination = SigAction::new(
        SigHandler::Handler(on_termination),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    let cont = SigAction::new(
        SigHandler::Handler(on_continue),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    let fault = SigAction::new(
        SigHandler::Handler(on_fault),
        SaFlags::SA_RESETHAND,
        SigSet::empty(),
    );

    // SAFETY: the handlers only touch atomics, or write(2) then abort.
    unsafe {
        for signal in [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP, Signal::SIGQUIT] {
            sigaction(signal, &termination)?;
        }
        sigaction(Signal::SIGCONT, &cont)?;
        sigaction(Signal::SIGSEGV, &fault)?;
        sigaction(Signal::SIGFPE, &fault)?;
    }
    Ok(())
}

/// `SIGTERM`-style name of a raw signal number.
pub fn signal_name(signal: c_int) -> String {
    match Signal::try_from(signal) {
        Ok(signal) => signal.as_str().to_string(),
        Err(_) => format!("signal {signal}"),
    }
}

/// Drives a running topology until a termination signal has been handled.
pub struct Watcher<'a> {
    flags: &'a SignalFlags,
    interval: Duration,
    state: EngineState,
}

impl<'a> Watcher<'a> {
    pub fn new(flags: &'a SignalFlags, interval: Duration) -> Self {
        Self {
            flags,
            interval,
            state: EngineState::Running,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// One check of the flags. Dumps the configuration on request and,
    /// once a termination signal is seen, drains `topology`.
    pub fn poll(&mut self, topology: &mut Topology, service: &ServiceConfig) -> EngineState {
        if self.state == EngineState::Terminated {
            return self.state;
        }

        if self.flags.take_dump() {
            eprint!("{}", topology.dump(service));
        }

        if let Some(signal) = self.flags.take_signal() {
            self.state = EngineState::Draining;
            eprintln!(
                "[{}] [engine] caught signal ({})",
                Local::now().format("%Y/%m/%d %H:%M:%S"),
                signal_name(signal)
            );

            let released = topology.stop();
            info!(released, grace = service.grace, "pipeline drained");
            self.state = EngineState::Terminated;
        }

        self.state
    }

    /// Polls every `interval` until the topology is terminated.
    pub async fn run(mut self, topology: &mut Topology, service: &ServiceConfig) -> EngineState {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            if self.poll(topology, service) == EngineState::Terminated {
                return self.state;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_consumed_once() {
        let flags = SignalFlags::new();
        assert_eq!(flags.take_signal(), None);

        flags.raise(Signal::SIGTERM as c_int);
        flags.request_dump();
        assert_eq!(flags.take_signal(), Some(Signal::SIGTERM as c_int));
        assert_eq!(flags.take_signal(), None);
        assert!(flags.take_dump());
        assert!(!flags.take_dump());
    }

    #[test]
    fn test_signal_names() {
        assert_eq!(signal_name(Signal::SIGTERM as c_int), "SIGTERM");
        assert_eq!(signal_name(Signal::SIGINT as c_int), "SIGINT");
        assert_eq!(signal_name(9999), "signal 9999");
    }

    #[test]
    fn test_dump_request_does_not_change_state() {
        let flags = SignalFlags::new();
        let mut watcher = Watcher::new(&flags, Duration::from_millis(10));
        let mut topology = Topology::new();

        flags.request_dump();
        assert!(flags.dump.load(Ordering::SeqCst));
        let state = watcher.poll(&mut topology, &ServiceConfig::default());
        assert_eq!(state, EngineState::Running);
        // The next tick serves the request.
        assert!(!flags.take_dump());
    }

    #[tokio::test]
    async fn test_watcher_drains_after_signal() {
        let flags = SignalFlags::new();
        let watcher = Watcher::new(&flags, Duration::from_millis(10));
        let mut topology = Topology::new();
        topology.start();

        flags.raise(Signal::SIGINT as c_int);
        let state = watcher.run(&mut topology, &ServiceConfig::default()).await;
        assert_eq!(state, EngineState::Terminated);
        assert!(!topology.is_running());
    }
}
