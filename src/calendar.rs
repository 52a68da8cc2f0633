use serde::{Deserialize, Serialize};
use std::fmt;

/// Teaching days, in week order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Day {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
}

pub const DAYS: [Day; 5] = [
    Day::Sunday,
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
];

pub const BLOCKS_PER_DAY: u8 = 8;
pub const BLOCK_MINUTES: u32 = 45;

/// Wall-clock (start, end) per block. The breaks after blocks 1, 3 and 5
/// are folded into the table so block indices stay contiguous.
pub const BLOCK_TIMES: [(&str, &str); 8] = [
    ("09:00", "09:45"),
    ("09:45", "10:30"),
    ("10:45", "11:30"),
    ("11:30", "12:15"),
    ("12:30", "13:15"),
    ("13:15", "14:00"),
    ("14:15", "15:00"),
    ("15:00", "15:45"),
];

// A 2-block session must not straddle a break, so it can only start on an
// even block.
const TWO_BLOCK_STARTS: [u8; 4] = [0, 2, 4, 6];
const ONE_BLOCK_STARTS: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Legal start blocks for a session of the given duration.
pub fn legal_starts(duration_blocks: u8) -> &'static [u8] {
    if duration_blocks == 2 {
        &TWO_BLOCK_STARTS
    } else {
        &ONE_BLOCK_STARTS
    }
}

/// Wall-clock start of a block.
pub fn block_start(block: u8) -> &'static str {
    BLOCK_TIMES[block as usize].0
}

/// Wall-clock end of a block.
pub fn block_end(block: u8) -> &'static str {
    BLOCK_TIMES[block as usize].1
}

impl Day {
    pub fn as_str(self) -> &'static str {
        match self {
            Day::Sunday => "Sunday",
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_block_sessions_start_on_even_blocks_only() {
        assert_eq!(legal_starts(2), &[0, 2, 4, 6]);
    }

    #[test]
    fn one_block_sessions_start_anywhere() {
        assert_eq!(legal_starts(1), &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn block_table_skips_the_breaks() {
        assert_eq!(block_start(0), "09:00");
        assert_eq!(block_end(1), "10:30");
        // 15 minutes pass between block 1 and block 2
        assert_eq!(block_start(2), "10:45");
        assert_eq!(block_start(4), "12:30");
        assert_eq!(block_start(6), "14:15");
        assert_eq!(block_end(7), "15:45");
    }

    #[test]
    fn days_serialize_as_their_names() {
        assert_eq!(serde_json::to_string(&Day::Sunday).unwrap(), "\"Sunday\"");
        assert_eq!(Day::Wednesday.as_str(), "Wednesday");
    }
}
