//! Feature-gated logging for the de-esser.
//!
//! Messages are formatted into fixed-size slots of a single-producer ring, so
//! `ds_log!` is usable from the audio thread. The ring is only written to
//! disk from non-real-time callbacks via [`logger::drain_to_file`].

use std::fmt;

#[cfg(feature = "debug")]
pub mod logger {
    use std::cell::UnsafeCell;
    use std::fmt;
    use std::fs::OpenOptions;
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::OnceLock;

    const SLOTS: usize = 64;
    const SLOT_BYTES: usize = 256;
    const LOG_PATH: &str = "/tmp/multiband_deesser.log";

    /// One formatted message. Text past `SLOT_BYTES` is cut off.
    #[derive(Copy, Clone)]
    struct Slot {
        len: usize,
        bytes: [u8; SLOT_BYTES],
    }

    impl Slot {
        const EMPTY: Slot = Slot {
            len: 0,
            bytes: [0; SLOT_BYTES],
        };

        fn text(&self) -> &str {
            match std::str::from_utf8(&self.bytes[..self.len]) {
                Ok(s) => s,
                // Truncation may split a code point; keep the valid prefix.
                Err(e) => std::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or(""),
            }
        }
    }

    impl fmt::Write for Slot {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let n = s.len().min(SLOT_BYTES - self.len);
            self.bytes[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
            self.len += n;
            Ok(())
        }
    }

    struct Ring {
        head: AtomicUsize,
        tail: AtomicUsize,
        dropped: AtomicUsize,
        slots: Box<[UnsafeCell<Slot>]>,
    }

    // Single writer (audio thread) and single reader (drain), ordered by head/tail.
    unsafe impl Sync for Ring {}

    impl Ring {
        fn new() -> Self {
            Self {
                head: AtomicUsize::new(0),
                tail: AtomicUsize::new(0),
                dropped: AtomicUsize::new(0),
                slots: (0..SLOTS).map(|_| UnsafeCell::new(Slot::EMPTY)).collect(),
            }
        }

        fn push(&self, slot: &Slot) {
            let head = self.head.load(Ordering::Relaxed);
            let next = (head + 1) % SLOTS;
            if next == self.tail.load(Ordering::Acquire) {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            unsafe {
                *self.slots[head].get() = *slot;
            }
            self.head.store(next, Ordering::Release);
        }

        fn pop(&self) -> Option<Slot> {
            let tail = self.tail.load(Ordering::Relaxed);
            if tail == self.head.load(Ordering::Acquire) {
                return None;
            }
            let slot = unsafe { *self.slots[tail].get() };
            self.tail.store((tail + 1) % SLOTS, Ordering::Release);
            Some(slot)
        }
    }

    static RING: OnceLock<Ring> = OnceLock::new();
    static ENABLED: AtomicBool = AtomicBool::new(false);

    /// Allocate the ring. Call from a non-real-time context before logging.
    pub fn init_logger() {
        RING.get_or_init(Ring::new);
        ENABLED.store(true, Ordering::Relaxed);
    }

    pub fn log_args(args: fmt::Arguments) {
        if !ENABLED.load(Ordering::Relaxed) {
            return;
        }
        let Some(ring) = RING.get() else {
            return;
        };

        let mut slot = Slot::EMPTY;
        let _ = fmt::write(&mut slot, args);
        ring.push(&slot);
    }

    /// Append pending messages to the log file. Errors are swallowed.
    pub fn drain_to_file() {
        let _ = try_drain();
    }

    fn try_drain() -> io::Result<()> {
        let Some(ring) = RING.get() else {
            return Ok(());
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(LOG_PATH)?;

        while let Some(slot) = ring.pop() {
            if slot.len > 0 {
                writeln!(file, "{}", slot.text())?;
            }
        }

        let dropped = ring.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            writeln!(file, "({} messages dropped, ring full)", dropped)?;
        }
        Ok(())
    }
}

#[cfg(feature = "debug")]
pub(crate) fn ds_log_inner(args: fmt::Arguments) {
    logger::log_args(args);
}

#[cfg(not(feature = "debug"))]
pub(crate) fn ds_log_inner(_args: fmt::Arguments) {}

#[macro_export]
macro_rules! ds_log {
    ($($arg:tt)*) => {
        $crate::debug::ds_log_inner(format_args!($($arg)*))
    };
}
