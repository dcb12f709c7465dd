//! Capability interface for the real-time clock.

/// Source of FAT-packed date/time words for directory timestamps.
///
/// Date: bits 15..9 year-since-1980, 8..5 month, 4..0 day.
/// Time: bits 15..11 hours, 10..5 minutes, 4..0 seconds/2.
///
/// An implementation with no backing clock may always return 0.
pub trait RealTimeClock {
    fn fat_date(&self) -> u16;
    fn fat_time(&self) -> u16;
}

/// A clock that always reports the FAT epoch, for callers with no RTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullClock;

impl RealTimeClock for NullClock {
    fn fat_date(&self) -> u16 {
        0
    }

    fn fat_time(&self) -> u16 {
        0
    }
}
