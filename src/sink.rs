use std::fs::File;
use std::io::{self, IsTerminal};

/// Capability probe for the destination formatted bytes are written to.
///
/// Formatters call [`TerminalProbe::is_terminal`] once while being built
/// and never again, so implementations may do I/O (an `isatty` call, for
/// instance) without affecting the per-event path.
pub trait TerminalProbe {
    /// Whether the sink is an interactive terminal.
    fn is_terminal(&self) -> bool;
}

impl TerminalProbe for io::Stdout {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl TerminalProbe for io::Stderr {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl TerminalProbe for io::StdoutLock<'_> {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl TerminalProbe for io::StderrLock<'_> {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl TerminalProbe for File {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

/// In-memory sinks are never terminals.
impl TerminalProbe for Vec<u8> {
    fn is_terminal(&self) -> bool {
        false
    }
}

/// A fixed answer, for sinks that cannot be probed or for tests.
impl TerminalProbe for bool {
    fn is_terminal(&self) -> bool {
        *self
    }
}

impl<T: TerminalProbe + ?Sized> TerminalProbe for &T {
    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }
}

/// Whether colored output is supported on this platform at all.
pub fn platform_supports_color() -> bool {
    !cfg!(windows)
}
