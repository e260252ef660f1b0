use rand::Rng;

/// Fixed relative-time vocabulary for synthesized news timestamps. The UI
/// formats these verbatim, so synthesized values must come from this list.
pub const RELATIVE_TIMES: [&str; 8] = [
    "1h ago", "2h ago", "3h ago", "4h ago", "5h ago", "6h ago", "12h ago", "1d ago",
];

/// Source of synthesized timestamps for news items whose source text carries
/// no date/time token. Isolated behind a trait so tests can substitute a
/// deterministic value.
pub trait TimestampPicker: Send + Sync {
    fn pick(&self) -> String;
}

/// Default picker: uniform draw from the fixed vocabulary.
#[derive(Debug, Default)]
pub struct RandomTimestamps;

impl TimestampPicker for RandomTimestamps {
    fn pick(&self) -> String {
        let idx = rand::thread_rng().gen_range(0..RELATIVE_TIMES.len());
        RELATIVE_TIMES[idx].to_string()
    }
}

/// Deterministic picker for tests and reproducible output.
#[derive(Debug)]
pub struct FixedTimestamp(pub &'static str);

impl TimestampPicker for FixedTimestamp {
    fn pick(&self) -> String {
        self.0.to_string()
    }
}
