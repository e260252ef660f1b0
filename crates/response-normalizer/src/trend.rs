use insight_core::Trend;

/// "Up" vocabulary, checked before the "down" vocabulary so conflicting
/// signals resolve upward. Word entries are stems so inflected forms
/// ("increasing", "increased") match too.
const UP_SIGNALS: &[&str] = &[
    "up", "positive", "+", "increas", "grow", "bullish",
    "🔺", "⬆", "↑", "▲", "📈",
];

const DOWN_SIGNALS: &[&str] = &[
    "down", "negative", "-", "decreas", "declin", "bearish",
    "🔻", "⬇", "↓", "▼", "📉",
];

/// Map a free-text directional signal (a change cell, a sentiment word, an
/// emoji) to a trend. Total function: any input, including `None`, yields one
/// of the three trends and never fails.
pub fn classify(signal: Option<&str>) -> Trend {
    let Some(signal) = signal else {
        return Trend::Neutral;
    };
    let lowered = signal.to_lowercase();
    if UP_SIGNALS.iter().any(|s| lowered.contains(s)) {
        Trend::Up
    } else if DOWN_SIGNALS.iter().any(|s| lowered.contains(s)) {
        Trend::Down
    } else {
        Trend::Neutral
    }
}
