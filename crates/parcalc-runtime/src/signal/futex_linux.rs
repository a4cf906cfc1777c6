//! Linux futex-based binary signal
//!
//! Futex word semantics:
//! - 0 = taken
//! - 1 = available
//!
//! When acquiring:
//! 1. CAS 1 -> 0; done if it succeeds
//! 2. Increment waiter count
//! 3. FUTEX_WAIT on the word (sleeps only while word == 0)
//! 4. Decrement waiter count, retry from 1
//!
//! When releasing:
//! 1. Store 1
//! 2. FUTEX_WAKE one waiter if any are registered

use super::Signal;
use nix::errno::Errno;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

const TAKEN: u32 = 0;
const AVAILABLE: u32 = 1;

/// Linux futex-based signal
pub struct FutexSignal {
    /// Futex word: 0 = taken, 1 = available
    word: AtomicU32,

    /// Threads inside `acquire()` that may be sleeping
    waiters: AtomicUsize,
}

impl FutexSignal {
    /// Create a signal, initially available or taken
    pub fn new(available: bool) -> Self {
        Self {
            word: AtomicU32::new(if available { AVAILABLE } else { TAKEN }),
            waiters: AtomicUsize::new(0),
        }
    }

    fn futex_wait(&self) {
        // FUTEX_WAIT: sleep while word == TAKEN, no timeout
        let result = unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.word.as_ptr(),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                TAKEN,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            )
        };

        if result == -1 {
            match Errno::last() {
                // Word changed before we slept, or a signal interrupted us
                Errno::EAGAIN | Errno::EINTR => {}
                errno => log::trace!("futex wait returned {}", errno),
            }
        }
    }

    fn futex_wake_one(&self) {
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.word.as_ptr(),
                libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                1i32,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            );
        }
    }
}

impl Default for FutexSignal {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Signal for FutexSignal {
    fn acquire(&self) {
        loop {
            if self.try_acquire() {
                return;
            }

            self.waiters.fetch_add(1, Ordering::SeqCst);
            // Re-check after registering so a concurrent release cannot skip the wake
            if self.word.load(Ordering::SeqCst) == TAKEN {
                self.futex_wait();
            }
            self.waiters.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[inline]
    fn try_acquire(&self) -> bool {
        self.word
            .compare_exchange(AVAILABLE, TAKEN, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    fn release(&self) {
        self.word.store(AVAILABLE, Ordering::SeqCst);

        if self.waiters.load(Ordering::SeqCst) > 0 {
            self.futex_wake_one();
        }
    }

    #[inline]
    fn is_available(&self) -> bool {
        self.word.load(Ordering::Acquire) == AVAILABLE
    }

    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}

// Safety: FutexSignal only contains atomics
unsafe impl Send for FutexSignal {}
unsafe impl Sync for FutexSignal {}
