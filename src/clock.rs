//! Timestamp sources for the measurement loop.
//!
//! Two backends are provided:
//! - [`WallClock`]: monotonic, non-adjustable system clock, nanoseconds.
//!   On Linux this is `CLOCK_MONOTONIC_RAW`, which is neither stepped nor
//!   slewed by NTP. Elsewhere it falls back to `std::time::Instant`.
//! - [`CycleCounter`]: the CPU's timestamp counter, raw cycles.
//!   - x86_64: `rdtscp; lfence`
//!   - aarch64: `isb; mrs cntvct_el0`
//!
//! Cycle counts are not a time unit. Converting them needs the counter
//! frequency, and results from different runs are only comparable when the
//! CPU frequency is pinned (no turbo, no dynamic scaling).

use std::sync::atomic::{compiler_fence, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// A raw reading from a [`Clock`]. Meaning depends on the backend and
/// readings from different backends are never comparable.
pub type Timestamp = u64;

#[cfg(target_os = "linux")]
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Unit of a backend's timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Nanoseconds,
    Cycles,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Nanoseconds => "ns",
            Unit::Cycles => "cycles",
        }
    }

    /// Whether the unit measures elapsed time (and so supports a rate).
    pub fn is_time(&self) -> bool {
        matches!(self, Unit::Nanoseconds)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A source of monotonically non-decreasing timestamps.
pub trait Clock {
    const UNIT: Unit;

    /// Name for diagnostics and report metadata.
    fn name(&self) -> &'static str;

    /// Read the current timestamp.
    ///
    /// Fails only when the underlying source cannot be read, which is fatal.
    fn now(&self) -> Result<Timestamp, BenchError>;
}

/// Compiler ordering barrier.
///
/// Memory accesses may not be moved across this point by the optimizer. It
/// brackets the unit of work so none of it is scheduled outside the timed
/// region.
#[inline(always)]
pub fn ordering_barrier() {
    compiler_fence(Ordering::SeqCst);
}

/// Reassemble a 64-bit counter exposed as two 32-bit halves.
#[inline(always)]
pub const fn combine_halves(hi: u32, lo: u32) -> u64 {
    ((hi as u64) << 32) | lo as u64
}

/// Monotonic wall-clock timer reporting nanoseconds.
///
/// Only obtainable through [`WallClock::new`], which has read the source once.
#[derive(Clone, Debug)]
pub struct WallClock {
    #[cfg(not(target_os = "linux"))]
    origin: std::time::Instant,
    _probed: (),
}

impl WallClock {
    /// Create the clock and probe it once.
    pub fn new() -> Result<Self, BenchError> {
        let clock = Self {
            #[cfg(not(target_os = "linux"))]
            origin: std::time::Instant::now(),
            _probed: (),
        };
        clock.now()?;
        Ok(clock)
    }
}

impl Clock for WallClock {
    const UNIT: Unit = Unit::Nanoseconds;

    fn name(&self) -> &'static str {
        #[cfg(target_os = "linux")]
        {
            "monotonic_raw"
        }
        #[cfg(not(target_os = "linux"))]
        {
            "instant"
        }
    }

    #[inline(always)]
    fn now(&self) -> Result<Timestamp, BenchError> {
        #[cfg(target_os = "linux")]
        {
            read_monotonic_raw()
        }
        #[cfg(not(target_os = "linux"))]
        {
            Ok(self.origin.elapsed().as_nanos() as Timestamp)
        }
    }
}

#[cfg(target_os = "linux")]
#[inline(always)]
fn read_monotonic_raw() -> Result<Timestamp, BenchError> {
    let mut ts = std::mem::MaybeUninit::<libc::timespec>::uninit();
    // SAFETY: `ts` points to writable storage for one timespec.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, ts.as_mut_ptr()) };
    if rc != 0 {
        return Err(BenchError::ClockUnavailable {
            clock: "monotonic_raw",
            reason: std::io::Error::last_os_error().to_string(),
        });
    }
    // SAFETY: clock_gettime returned 0, so it initialized `ts`.
    let ts = unsafe { ts.assume_init() };
    Ok((ts.tv_sec as u64)
        .wrapping_mul(NANOS_PER_SEC)
        .wrapping_add(ts.tv_nsec as u64))
}

/// Hardware cycle counter reporting raw cycles.
///
/// Each read is serializing: it does not execute until every earlier
/// instruction has retired, and later instructions do not start before it.
#[derive(Clone, Copy, Debug)]
pub struct CycleCounter {
    _probed: (),
}

impl CycleCounter {
    /// Create the counter, failing if this CPU does not expose one.
    pub fn new() -> Result<Self, BenchError> {
        #[cfg(target_arch = "x86_64")]
        {
            if !has_rdtscp() {
                return Err(BenchError::ClockUnavailable {
                    clock: "rdtscp",
                    reason: "cpu does not support rdtscp".to_string(),
                });
            }
            Ok(Self { _probed: () })
        }
        #[cfg(target_arch = "aarch64")]
        {
            Ok(Self { _probed: () })
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Err(BenchError::ClockUnavailable {
                clock: "cycle_counter",
                reason: format!("no cycle counter on {}", std::env::consts::ARCH),
            })
        }
    }
}

impl Clock for CycleCounter {
    const UNIT: Unit = Unit::Cycles;

    fn name(&self) -> &'static str {
        #[cfg(target_arch = "x86_64")]
        {
            "rdtscp"
        }
        #[cfg(target_arch = "aarch64")]
        {
            "cntvct_el0"
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            "none"
        }
    }

    #[inline(always)]
    fn now(&self) -> Result<Timestamp, BenchError> {
        #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
        {
            Ok(read_cycles())
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Err(BenchError::ClockUnavailable {
                clock: "cycle_counter",
                reason: format!("no cycle counter on {}", std::env::consts::ARCH),
            })
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn has_rdtscp() -> bool {
    use std::arch::x86_64::__cpuid;

    // RDTSCP is reported in CPUID.80000001H:EDX[27].
    #[allow(unused_unsafe)]
    let (max_ext, edx) = unsafe {
        let max_ext = __cpuid(0x8000_0000).eax;
        let edx = if max_ext >= 0x8000_0001 {
            __cpuid(0x8000_0001).edx
        } else {
            0
        };
        (max_ext, edx)
    };
    max_ext >= 0x8000_0001 && edx & (1 << 27) != 0
}

/// x86_64: `rdtscp` waits for earlier instructions to retire, `lfence`
/// keeps later ones from starting before the read.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn read_cycles() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: rdtscp support is checked in `CycleCounter::new`. Both
    // instructions only write the declared registers. No `nomem`, so the
    // block is also a compiler memory barrier.
    unsafe {
        std::arch::asm!(
            "rdtscp",
            "lfence",
            out("eax") lo,
            out("edx") hi,
            out("ecx") _,
            options(nostack, preserves_flags),
        );
    }
    combine_halves(hi, lo)
}

/// aarch64: `isb` drains the pipeline before the virtual counter is read.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
fn read_cycles() -> u64 {
    let cycles: u64;
    // SAFETY: cntvct_el0 is readable from EL0 on every supported OS.
    unsafe {
        std::arch::asm!(
            "isb",
            "mrs {}, cntvct_el0",
            "isb",
            out(reg) cycles,
            options(nostack, preserves_flags),
        );
    }
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_halves_shifts_high_word() {
        assert_eq!(combine_halves(0, 0), 0);
        assert_eq!(combine_halves(0, 0xffff_ffff), 0xffff_ffff);
        assert_eq!(combine_halves(1, 0), 1 << 32);
        assert_eq!(
            combine_halves(0xdead_beef, 0x0123_4567),
            0xdead_beef_0123_4567
        );
    }

    #[test]
    fn wall_clock_is_monotonic() {
        let clock = WallClock::new().unwrap();
        let mut prev = clock.now().unwrap();
        for _ in 0..10_000 {
            let next = clock.now().unwrap();
            assert!(next >= prev, "prev={prev} next={next}");
            prev = next;
        }
    }

    #[test]
    fn wall_clock_constructor_reads_source() {
        let clock = WallClock::new().unwrap();
        assert!(clock.now().unwrap() > 0);
        #[cfg(target_os = "linux")]
        assert_eq!(clock.name(), "monotonic_raw");
    }

    #[test]
    fn wall_clock_tracks_sleep() {
        let clock = WallClock::new().unwrap();
        let start = clock.now().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let end = clock.now().unwrap();
        assert!(end - start >= 1_900_000, "elapsed = {}", end - start);
    }

    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    #[test]
    fn cycle_counter_is_monotonic() {
        let Ok(counter) = CycleCounter::new() else {
            return;
        };
        let mut prev = counter.now().unwrap();
        for _ in 0..10_000 {
            let next = counter.now().unwrap();
            assert!(next >= prev, "prev={prev} next={next}");
            prev = next;
        }
    }

    #[test]
    fn units() {
        assert_eq!(WallClock::UNIT.suffix(), "ns");
        assert_eq!(CycleCounter::UNIT.to_string(), "cycles");
        assert!(Unit::Nanoseconds.is_time());
        assert!(!Unit::Cycles.is_time());
    }
}
