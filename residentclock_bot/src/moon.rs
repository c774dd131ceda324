//! Approximate moon phase from the mean synodic month.

use chrono::{DateTime, TimeZone, Utc};

/// Lunation fraction at 2001-01-01 00:00 UTC.
const EPOCH_POSITION: f64 = 0.20439731;
/// Fraction of a lunation passing each day.
const DAILY_MOTION: f64 = 0.03386319269;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

const PHASES: [MoonPhase; 8] = [
    MoonPhase::New,
    MoonPhase::WaxingCrescent,
    MoonPhase::FirstQuarter,
    MoonPhase::WaxingGibbous,
    MoonPhase::Full,
    MoonPhase::WaningGibbous,
    MoonPhase::LastQuarter,
    MoonPhase::WaningCrescent,
];

impl MoonPhase {
    /// Phase at a lunation `position` in `[0, 1)`.
    pub fn from_position(position: f64) -> Self {
        let index = (position * 8.0 + 0.5).floor() as usize % PHASES.len();

        PHASES[index]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::New => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::Full => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoonPhase::New => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::Full => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }
}

/// Position within the current lunation, 0 is new moon and 0.5 full moon.
pub fn lunation_position(now: DateTime<Utc>) -> f64 {
    let epoch = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).single().unwrap_or_default();
    let days = (now - epoch).num_seconds() as f64 / 86_400.0;

    (EPOCH_POSITION + days * DAILY_MOTION).rem_euclid(1.0)
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(0.0, MoonPhase::New)]
    #[case(0.06, MoonPhase::New)]
    #[case(0.07, MoonPhase::WaxingCrescent)]
    #[case(0.25, MoonPhase::FirstQuarter)]
    #[case(0.5, MoonPhase::Full)]
    #[case(0.75, MoonPhase::LastQuarter)]
    #[case(0.9, MoonPhase::WaningCrescent)]
    #[case(0.95, MoonPhase::New)]
    fn phase_from_position(#[case] position: f64, #[case] expected: MoonPhase) {
        assert_eq!(MoonPhase::from_position(position), expected);
    }

    #[rstest]
    fn epoch_position() {
        let epoch = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();

        assert!((lunation_position(epoch) - EPOCH_POSITION).abs() < 1e-9);
    }

    #[rstest]
    // Known full and new moons.
    #[case(Utc.with_ymd_and_hms(2021, 1, 28, 19, 16, 0).unwrap(), MoonPhase::Full)]
    #[case(Utc.with_ymd_and_hms(2024, 4, 8, 18, 21, 0).unwrap(), MoonPhase::New)]
    fn matches_real_moons(#[case] when: DateTime<Utc>, #[case] expected: MoonPhase) {
        assert_eq!(MoonPhase::from_position(lunation_position(when)), expected);
    }

    #[rstest]
    fn position_stays_in_range() {
        let before_epoch = Utc.with_ymd_and_hms(1990, 6, 1, 0, 0, 0).unwrap();

        let position = lunation_position(before_epoch);

        assert!((0.0..1.0).contains(&position));
    }
}
