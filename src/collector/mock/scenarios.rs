//! Canned `/proc/stat` contents for testing.
//!
//! The two-core fixtures form a sequence: `BASELINE` then `ADVANCED` is a
//! normal interval, `ADVANCED` then `REGRESSED` exercises the counter
//! anomalies (one aggregate counter going backwards, one core counter going
//! backwards, and a core whose counters all go backwards).

use super::filesystem::MockFs;

/// Two cores, first reading.
pub const BASELINE: &str = "\
cpu  23359837 6006716 1209900 402135131 129307 4 2156 0 0 0
cpu0 3464284 998669 208226 49355234 57380 3 422 0 0 0
cpu1 3501681 1012206 189642 49374240 11620 0 278 0 0 0
intr 33594809 19 2 0 0 0 0 0 9 1 4 0 0 4 0 0 0 31 0 0
";

/// Two cores, every counter non-decreasing relative to `BASELINE`.
pub const ADVANCED: &str = "\
cpu  23472679 6048986 1215282 403105970 129312 4 2158 0 0 0
cpu0 3480506 1005574 209103 49472588 57381 3 424 0 0 0
cpu1 3516068 1019269 190413 49493320 11620 0 278 0 0 0
intr 33594809 19 2 0 0 0 0 0 9 1 4 0 0 4 0 0 0 31 0 0
";

/// Counter anomalies relative to `ADVANCED`:
/// aggregate `user` decreases while `nice` advances the total,
/// `cpu0` `nice` decreases while the rest advance,
/// every `cpu1` counter decreases.
pub const REGRESSED: &str = "\
cpu  23472670 6049996 1215282 403105970 129312 4 2158 0 0 0
cpu0 3480508 1005570 209105 49472590 57390 3 430 0 0 0
cpu1 3516060 1019260 190410 49493310 11610 0 270 0 0 0
";

/// A core line with only nine counters.
pub const TRUNCATED: &str = "\
cpu  23472679 6048986 1215282 403105970 129312 4 2158 0 0 0
cpu0 3480506 1005574 209103 49472588 57381 3 424 0 0
cpu1 3516068 1019269 190413 49493320 11620 0 278 0 0 0
";

/// Non-numeric counters on the aggregate line.
pub const GARBLED: &str = "\
cpu  * # # 403105970 129312 4 2158 0 0 0
cpu0 3480506 1005574 209103 49472588 57381 3 424 0 0 0
cpu1 3516068 1019269 190413 49493320 11620 0 278 0 0 0
intr 33594809 19 2 0 0 0 0 0 9 1 4 0 0 4 0 0 0 31 0 0
";

/// Four identical cores with a full `/proc/stat` tail.
pub const QUAD_CORE: &str = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 12345
procs_running 2
procs_blocked 0
softirq 100000 0 50000 0 10000 0 0 20000 0 0 20000
";

impl MockFs {
    /// Two-core system at its first reading.
    pub fn two_core_system() -> Self {
        Self::with_stat(BASELINE)
    }

    /// Four-core system with the non-CPU lines a real kernel prints.
    pub fn typical_system() -> Self {
        Self::with_stat(QUAD_CORE)
    }
}
