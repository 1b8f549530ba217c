//! RTMP timestamps are 32 bit unsigned integers representing the number of milliseconds from
//! an unknown epoch.
//!
//! Since a stream is allowed to go on forever, timestamp arithmetic wraps around at 2<sup>32</sup>
//! instead of overflowing.  Chunk headers only ever carry deltas or absolute values, so wrapping
//! addition and subtraction is all that is needed to turn them back into message timestamps.
//!
//! ```
//! use rml_rtmp_framing::time::RtmpTimestamp;
//!
//! let time = RtmpTimestamp::new(u32::MAX - 5);
//! assert_eq!(time + 10, RtmpTimestamp::new(4));
//! assert_eq!(RtmpTimestamp::new(4) - time, RtmpTimestamp::new(10));
//! ```

use std::fmt;
use std::ops::{Add, Sub};

/// The representation of a RTMP timestamp
#[derive(Eq, PartialEq, Debug, Copy, Clone, Default, Hash)]
pub struct RtmpTimestamp {
    /// The time (as milliseconds from an unknown epoch) being represented by the timestamp
    pub value: u32,
}

impl RtmpTimestamp {
    /// Creates a new timestamp with the specified time value
    pub fn new(initial_value: u32) -> Self {
        RtmpTimestamp {
            value: initial_value,
        }
    }

    /// Sets the timestamp to a new time value
    pub fn set(&mut self, new_value: u32) {
        self.value = new_value;
    }
}

impl Add for RtmpTimestamp {
    type Output = RtmpTimestamp;

    fn add(self, other: RtmpTimestamp) -> Self {
        self + other.value
    }
}

impl Add<u32> for RtmpTimestamp {
    type Output = RtmpTimestamp;

    fn add(self, other: u32) -> Self {
        RtmpTimestamp {
            value: self.value.wrapping_add(other),
        }
    }
}

impl Sub for RtmpTimestamp {
    type Output = RtmpTimestamp;

    fn sub(self, other: RtmpTimestamp) -> Self {
        self - other.value
    }
}

impl Sub<u32> for RtmpTimestamp {
    type Output = RtmpTimestamp;

    fn sub(self, other: u32) -> Self {
        RtmpTimestamp {
            value: self.value.wrapping_sub(other),
        }
    }
}

impl PartialEq<u32> for RtmpTimestamp {
    fn eq(&self, other: &u32) -> bool {
        self.value == *other
    }
}

impl fmt::Display for RtmpTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.value)
    }
}
