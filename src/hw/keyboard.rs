//! Keyboard Sources
//!
//! A hidraw keyboard is read on its own OS thread: reads block in the kernel
//! until the next report, which must never stall a tick. The thread publishes
//! each snapshot into a `watch` channel and the tick loop samples the latest
//! one. Keyboards only report on change, so the last snapshot stays current.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::game::input::{InputError, KeySnapshot, KeySource};

/// Largest report read in one call.
const MAX_REPORT_LEN: usize = 64;

// =============================================================================
// HIDRAW
// =============================================================================

/// USB keyboard behind a Linux hidraw node, in boot protocol.
#[derive(Debug)]
pub struct HidrawKeyboard {
    file: File,
    path: PathBuf,
}

impl HidrawKeyboard {
    /// Open the hidraw node read-only.
    pub fn open(path: &Path) -> Result<Self, InputError> {
        let file = File::open(path).map_err(|source| InputError::Open {
            path: path.display().to_string(),
            source,
        })?;
        info!("Keyboard opened: {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Block until the next report and parse it.
    pub fn read_report(&mut self) -> Result<KeySnapshot, InputError> {
        let mut buf = [0u8; MAX_REPORT_LEN];
        let n = self.file.read(&mut buf)?;
        if n == 0 {
            return Err(InputError::Disconnected);
        }
        KeySnapshot::from_boot_report(&buf[..n])
    }

    /// Move the keyboard onto a detached reader thread.
    ///
    /// The thread exits, dropping `tx`, when the device fails or every
    /// receiver is gone.
    pub fn spawn_reader(mut self, tx: watch::Sender<KeySnapshot>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("hid-reader".into())
            .spawn(move || {
                loop {
                    match self.read_report() {
                        Ok(snapshot) => {
                            trace!("Report: {:?}", snapshot.keys);
                            if tx.send(snapshot).is_err() {
                                debug!("Key receiver dropped, reader exiting");
                                break;
                            }
                        }
                        Err(InputError::ShortReport(len)) => {
                            trace!("Ignoring {}-byte report", len);
                        }
                        Err(e) => {
                            warn!("Keyboard {} lost: {}", self.path.display(), e);
                            break;
                        }
                    }
                }
            })
    }
}

// =============================================================================
// WATCH
// =============================================================================

/// Tick-loop side of the reader thread.
#[derive(Debug)]
pub struct WatchKeys {
    rx: watch::Receiver<KeySnapshot>,
}

impl WatchKeys {
    /// Wrap a receiver.
    pub fn new(rx: watch::Receiver<KeySnapshot>) -> Self {
        Self { rx }
    }

    /// Channel for a reader plus the source that samples it.
    pub fn channel() -> (watch::Sender<KeySnapshot>, Self) {
        let (tx, rx) = watch::channel(KeySnapshot::EMPTY);
        (tx, Self::new(rx))
    }
}

impl KeySource for WatchKeys {
    /// Never waits: the latest published snapshot is always available.
    fn poll_keys(&mut self, _timeout: Duration) -> Result<KeySnapshot, InputError> {
        if self.rx.has_changed().is_err() {
            return Err(InputError::Disconnected);
        }
        Ok(*self.rx.borrow_and_update())
    }
}

// =============================================================================
// SCRIPTED
// =============================================================================

/// Replays a fixed sequence of poll results, then times out forever.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    script: VecDeque<Option<KeySnapshot>>,
}

impl ScriptedKeys {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot.
    pub fn push(&mut self, snapshot: KeySnapshot) -> &mut Self {
        self.script.push_back(Some(snapshot));
        self
    }

    /// Queue `count` snapshots holding exactly `codes`.
    pub fn hold(&mut self, codes: &[u8], count: usize) -> &mut Self {
        for _ in 0..count {
            self.push(KeySnapshot::pressed(codes));
        }
        self
    }

    /// Queue a failed poll.
    pub fn timeout(&mut self) -> &mut Self {
        self.script.push_back(None);
        self
    }

    /// Polls left in the script.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl KeySource for ScriptedKeys {
    fn poll_keys(&mut self, _timeout: Duration) -> Result<KeySnapshot, InputError> {
        self.script.pop_front().flatten().ok_or(InputError::Timeout)
    }
}
