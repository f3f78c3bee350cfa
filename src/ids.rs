use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::fmt;

const TRACK_ID_LEN: usize = 9;

/// Id generation is injected into the core so tests can supply
/// deterministic ids.
pub trait IdSource: fmt::Debug {
    fn track_id(&mut self) -> String;
    fn playlist_id(&mut self) -> String;
}

/// Production source: short random alphanumeric track ids and time-based
/// playlist ids that are bumped when two are allocated in the same
/// millisecond, so playlist ids stay monotonic.
#[derive(Debug)]
pub struct SystemIdSource {
    rng: SmallRng,
    last_playlist_stamp: i128,
}

impl SystemIdSource {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
            last_playlist_stamp: 0,
        }
    }
}

impl Default for SystemIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SystemIdSource {
    fn track_id(&mut self) -> String {
        let mut id = String::with_capacity(TRACK_ID_LEN);
        for _ in 0..TRACK_ID_LEN {
            let ch = char::from(self.rng.sample(rand::distr::Alphanumeric));
            id.push(ch.to_ascii_lowercase());
        }
        id
    }

    fn playlist_id(&mut self) -> String {
        let mut stamp = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        if stamp <= self.last_playlist_stamp {
            stamp = self.last_playlist_stamp + 1;
        }
        self.last_playlist_stamp = stamp;
        format!("pl-{stamp}")
    }
}

/// Deterministic source for tests: `t1`, `t2`, ... and `p1`, `p2`, ...
#[derive(Debug, Default)]
pub struct SequentialIdSource {
    next_track: u64,
    next_playlist: u64,
}

impl SequentialIdSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIdSource {
    fn track_id(&mut self) -> String {
        self.next_track += 1;
        format!("t{}", self.next_track)
    }

    fn playlist_id(&mut self) -> String {
        self.next_playlist += 1;
        format!("p{}", self.next_playlist)
    }
}
