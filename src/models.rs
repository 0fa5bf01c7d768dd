use crate::timeutil::{self, SECS_PER_DAY, SECS_PER_WEEK};

/// Task has not been deactivated. One-shot tasks lose this automatically
/// once their end time passes.
pub const FLAG_ACTIVE: u8 = 0x01;
/// Task recurs every week.
pub const FLAG_WEEKLY: u8 = 0x02;
/// Task recurs every day.
pub const FLAG_DAILY: u8 = 0x04;
/// User asked to be warned when this task overlaps other tasks.
pub const FLAG_COLLISION_WARNING: u8 = 0x08;
// Upper four bits are reserved.

/// Bytes of the on-disk name field, terminator included.
pub const NAME_FIELD: usize = 64;
/// Longest name that fits the field alongside its terminator.
pub const NAME_MAXLEN: usize = NAME_FIELD - 1;
/// On-disk size of one record: name, start time, duration, repeat count,
/// importance, flags.
pub const RECORD_SIZE: usize = NAME_FIELD + 8 + 2 + 2 + 1 + 1;

/// One schedulable item: name, timing, importance, recurrence and status.
///
/// Serializes to a fixed-size record so a store file is addressable by
/// logical index alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    /// Scheduled start, epoch seconds.
    pub start_time: i64,
    pub duration_mins: u16,
    /// Times this task has been rolled forward by recurrence advancement.
    pub repeat_count: u16,
    /// Priority rating, 0-255.
    pub importance: u8,
    pub flags: u8,
}

impl Task {
    /// A fresh, active record. Recurrence and collision-warning flags are
    /// set by the caller afterwards.
    pub fn new(name: impl Into<String>, start_time: i64, duration_mins: u16, importance: u8) -> Self {
        Self {
            name: name.into(),
            start_time,
            duration_mins,
            repeat_count: 0,
            importance,
            flags: FLAG_ACTIVE,
        }
    }

    pub fn end_time(&self) -> i64 {
        timeutil::end_time(self.start_time, self.duration_mins)
    }

    pub fn is_active(&self) -> bool {
        self.flags & FLAG_ACTIVE != 0
    }

    pub fn is_daily(&self) -> bool {
        self.flags & FLAG_DAILY != 0
    }

    pub fn is_weekly(&self) -> bool {
        self.flags & FLAG_WEEKLY != 0
    }

    pub fn is_recurrent(&self) -> bool {
        self.flags & (FLAG_DAILY | FLAG_WEEKLY) != 0
    }

    pub fn warns_on_collision(&self) -> bool {
        self.flags & FLAG_COLLISION_WARNING != 0
    }

    pub fn set_flag(&mut self, flag: u8) {
        self.flags |= flag;
    }

    pub fn clear_flag(&mut self, flag: u8) {
        self.flags &= !flag;
    }

    /// Roll the record past every elapsed occurrence.
    ///
    /// A daily or weekly task steps forward one period at a time, counting
    /// each step in `repeat_count`, until its end lies in the future again.
    /// A one-shot task whose end has passed is deactivated instead; its
    /// other fields stay untouched.
    pub fn advance(&mut self, now: i64) {
        if now < self.end_time() {
            return;
        }
        if self.is_daily() {
            while now >= self.end_time() {
                self.start_time += SECS_PER_DAY;
                self.repeat_count = self.repeat_count.saturating_add(1);
            }
        } else if self.is_weekly() {
            while now >= self.end_time() {
                self.start_time += SECS_PER_WEEK;
                self.repeat_count = self.repeat_count.saturating_add(1);
            }
        } else {
            self.clear_flag(FLAG_ACTIVE);
        }
    }

    /// Serialize into the fixed on-disk layout. Names longer than the name
    /// field are cut at a character boundary; the rest of the field is
    /// zero-padded.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        let name = truncate_name(&self.name);
        buf[..name.len()].copy_from_slice(name.as_bytes());
        buf[NAME_FIELD..NAME_FIELD + 8].copy_from_slice(&self.start_time.to_le_bytes());
        buf[NAME_FIELD + 8..NAME_FIELD + 10].copy_from_slice(&self.duration_mins.to_le_bytes());
        buf[NAME_FIELD + 10..NAME_FIELD + 12].copy_from_slice(&self.repeat_count.to_le_bytes());
        buf[NAME_FIELD + 12] = self.importance;
        buf[NAME_FIELD + 13] = self.flags;
        buf
    }

    /// Deserialize from the fixed on-disk layout.
    pub fn decode(buf: &[u8; RECORD_SIZE]) -> Self {
        let name_end = buf[..NAME_FIELD]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_FIELD);
        let name = String::from_utf8_lossy(&buf[..name_end]).into_owned();
        let mut start = [0u8; 8];
        start.copy_from_slice(&buf[NAME_FIELD..NAME_FIELD + 8]);
        let mut duration = [0u8; 2];
        duration.copy_from_slice(&buf[NAME_FIELD + 8..NAME_FIELD + 10]);
        let mut repeat = [0u8; 2];
        repeat.copy_from_slice(&buf[NAME_FIELD + 10..NAME_FIELD + 12]);
        Self {
            name,
            start_time: i64::from_le_bytes(start),
            duration_mins: u16::from_le_bytes(duration),
            repeat_count: u16::from_le_bytes(repeat),
            importance: buf[NAME_FIELD + 12],
            flags: buf[NAME_FIELD + 13],
        }
    }
}

/// Longest prefix of `name` that fits the name field, cut on a character
/// boundary.
fn truncate_name(name: &str) -> &str {
    if name.len() <= NAME_MAXLEN {
        return name;
    }
    let mut end = NAME_MAXLEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
