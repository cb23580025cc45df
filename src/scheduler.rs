//! Decides, once per tick, what needs redrawing.
//!
//! Two actions share one monotonic clock:
//! - **Clock**: redraw the time label every `clock` interval, extrapolating
//!   wall time from the last observation timestamp.
//! - **Weather**: fetch a new reading every `weather` interval (and on the
//!   very first tick), then redraw the icon, temperature, sun path and range
//!   bar. A refresh also redraws the clock from the fresh timestamp.
//!
//! The main loop just calls [`RefreshScheduler::tick`] as often as it likes;
//! ticks where nothing is due are cheap and draw nothing.
//!
//! ## Rust concepts
//! - `Instant` / `Duration` for a clock that wall-time changes don't affect
//! - `Option<Instant>` to model "never happened" instead of a sentinel value
//! - Generic `impl Surface` parameter so tests can record what was drawn

use crate::clock::ClockState;
use crate::dashboard::Dashboard;
use crate::surface::Surface;
use crate::weather::{WeatherReading, WeatherSource};
use std::time::{Duration, Instant};

/// How often each action runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Intervals {
    pub weather: Duration,
    /// Measured from the previous redraw, not aligned to the minute, so the
    /// label can trail the real minute change by up to one interval.
    pub clock: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            weather: Duration::from_secs(300),
            clock: Duration::from_secs(60),
        }
    }
}

/// When each action last ran. `None` means never, which makes it due.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshTimers {
    pub last_weather_fetch_at: Option<Instant>,
    pub last_clock_render_at: Option<Instant>,
}

/// What a tick ended up doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub clock_rendered: bool,
    pub weather_refreshed: bool,
}

impl TickOutcome {
    pub fn any(self) -> bool {
        self.clock_rendered || self.weather_refreshed
    }
}

/// The last observation timestamp and when (monotonically) it arrived.
#[derive(Clone, Copy, Debug)]
struct Anchor {
    observed_at: i64,
    received_at: Instant,
}

pub struct RefreshScheduler {
    source: WeatherSource,
    intervals: Intervals,
    utc_offset_seconds: i32,
    timers: RefreshTimers,
    anchor: Option<Anchor>,
    reading: WeatherReading,
    dashboard: Dashboard,
}

impl RefreshScheduler {
    pub fn new(source: WeatherSource, intervals: Intervals, utc_offset_seconds: i32) -> Self {
        Self {
            source,
            intervals,
            utc_offset_seconds,
            timers: RefreshTimers::default(),
            anchor: None,
            reading: WeatherReading::fallback(),
            dashboard: Dashboard::new(),
        }
    }

    /// Run the forced first refresh so the panel never shows placeholders
    /// once the loop is running.
    pub fn start(&mut self, now: Instant, surface: &mut impl Surface) -> TickOutcome {
        tracing::info!(
            "Starting with {} (weather every {}s, clock every {}s)",
            self.source.name(),
            self.intervals.weather.as_secs(),
            self.intervals.clock.as_secs()
        );
        self.tick(now, surface)
    }

    pub fn tick(&mut self, now: Instant, surface: &mut impl Surface) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if is_due(self.timers.last_weather_fetch_at, now, self.intervals.weather) {
            self.refresh_weather(now, surface);
            outcome.weather_refreshed = true;
        }

        if outcome.weather_refreshed
            || is_due(self.timers.last_clock_render_at, now, self.intervals.clock)
        {
            self.render_clock(now);
            outcome.clock_rendered = true;
        }

        if outcome.any() {
            surface.present(&self.dashboard);
        }
        outcome
    }

    /// Local time at `now`, extrapolated from the last observation.
    pub fn clock_at(&self, now: Instant) -> ClockState {
        let (observed_at, elapsed) = match self.anchor {
            Some(anchor) => (
                anchor.observed_at,
                now.saturating_duration_since(anchor.received_at),
            ),
            None => (self.reading.observed_at, Duration::ZERO),
        };
        ClockState::from_observation(observed_at, self.utc_offset_seconds, elapsed)
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// The most recent reading (the fallback until the first fetch).
    pub fn reading(&self) -> &WeatherReading {
        &self.reading
    }

    pub fn timers(&self) -> RefreshTimers {
        self.timers
    }

    fn refresh_weather(&mut self, now: Instant, surface: &mut impl Surface) {
        surface.set_loading(true);
        let reading = self.source.fetch();
        surface.set_loading(false);

        self.dashboard.show_weather(&reading);
        self.anchor = Some(Anchor {
            observed_at: reading.observed_at,
            received_at: now,
        });
        self.reading = reading;
        self.timers.last_weather_fetch_at = Some(now);
    }

    fn render_clock(&mut self, now: Instant) {
        let clock = self.clock_at(now);
        self.dashboard.show_time(clock);
        self.timers.last_clock_render_at = Some(now);
        tracing::debug!("Clock: {}", clock);
    }
}

fn is_due(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
    match last {
        None => true,
        Some(at) => now.saturating_duration_since(at) >= interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{FixtureSource, RawSource, WeatherError};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    enum Event {
        Loading(bool),
        Present(String),
    }

    #[derive(Default)]
    struct RecordingSurface {
        events: Vec<Event>,
    }

    impl Surface for RecordingSurface {
        fn set_loading(&mut self, loading: bool) {
            self.events.push(Event::Loading(loading));
        }

        fn present(&mut self, dashboard: &Dashboard) {
            self.events.push(Event::Present(dashboard.time_label.clone()));
        }
    }

    /// Serves the bundled fixture and counts fetches.
    struct CountingSource {
        fetches: Rc<Cell<usize>>,
        inner: FixtureSource,
    }

    impl RawSource for CountingSource {
        fn fetch_raw(&mut self) -> Result<String, WeatherError> {
            self.fetches.set(self.fetches.get() + 1);
            self.inner.fetch_raw()
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct BrokenSource;

    impl RawSource for BrokenSource {
        fn fetch_raw(&mut self) -> Result<String, WeatherError> {
            Err(WeatherError::Request("offline".to_string()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    const EST: i32 = -5 * 3600;

    fn scheduler() -> (RefreshScheduler, Rc<Cell<usize>>) {
        let fetches = Rc::new(Cell::new(0));
        let source = WeatherSource::new(CountingSource {
            fetches: fetches.clone(),
            inner: FixtureSource::bundled(),
        });
        (RefreshScheduler::new(source, Intervals::default(), EST), fetches)
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn first_tick_forces_fetch() {
        let (mut sched, fetches) = scheduler();
        let mut surface = RecordingSurface::default();
        let outcome = sched.start(Instant::now(), &mut surface);

        assert_eq!(
            outcome,
            TickOutcome {
                clock_rendered: true,
                weather_refreshed: true
            }
        );
        assert_eq!(fetches.get(), 1);
        assert_eq!(sched.reading().temperature_f, 45);
        assert_eq!(sched.dashboard().temp_label, "45°F");
    }

    #[test]
    fn weather_refreshes_only_after_interval() {
        let (mut sched, fetches) = scheduler();
        let mut surface = RecordingSurface::default();
        let t0 = Instant::now();
        sched.start(t0, &mut surface);

        for t in [100, 200, 299] {
            let outcome = sched.tick(t0 + secs(t), &mut surface);
            assert!(!outcome.weather_refreshed, "fetched at t={t}");
        }
        assert_eq!(fetches.get(), 1);

        assert!(sched.tick(t0 + secs(300), &mut surface).weather_refreshed);
        assert_eq!(fetches.get(), 2);
        assert_eq!(sched.timers().last_weather_fetch_at, Some(t0 + secs(300)));
    }

    #[rstest]
    #[case(301)]
    #[case(1000)]
    fn late_tick_still_refreshes(#[case] t: u64) {
        let (mut sched, fetches) = scheduler();
        let mut surface = RecordingSurface::default();
        let t0 = Instant::now();
        sched.start(t0, &mut surface);
        assert!(sched.tick(t0 + secs(t), &mut surface).weather_refreshed);
        assert_eq!(fetches.get(), 2);
    }

    #[test]
    fn clock_redraws_every_minute() {
        let (mut sched, _) = scheduler();
        let mut surface = RecordingSurface::default();
        let t0 = Instant::now();
        sched.start(t0, &mut surface);

        assert!(!sched.tick(t0 + secs(59), &mut surface).any());
        let outcome = sched.tick(t0 + secs(60), &mut surface);
        assert_eq!(
            outcome,
            TickOutcome {
                clock_rendered: true,
                weather_refreshed: false
            }
        );
        assert!(!sched.tick(t0 + secs(119), &mut surface).clock_rendered);
        assert!(sched.tick(t0 + secs(120), &mut surface).clock_rendered);
    }

    #[test]
    fn clock_extrapolates_from_observation() {
        let (mut sched, _) = scheduler();
        let mut surface = RecordingSurface::default();
        let t0 = Instant::now();
        sched.start(t0, &mut surface);

        // Fixture observation is 14:07:04 Eastern.
        assert_eq!(sched.dashboard().time_label, "02:07");
        sched.tick(t0 + secs(60), &mut surface);
        assert_eq!(sched.dashboard().time_label, "02:08");
        assert_eq!(sched.clock_at(t0 + secs(3 * 3600)), ClockState { hour: 17, minute: 7 });
    }

    #[test]
    fn weather_refresh_resets_extrapolation() {
        let (mut sched, _) = scheduler();
        let mut surface = RecordingSurface::default();
        let t0 = Instant::now();
        sched.start(t0, &mut surface);

        sched.tick(t0 + secs(240), &mut surface);
        assert_eq!(sched.dashboard().time_label, "02:11");

        // Same observation again, so the label steps back to it.
        assert!(sched.tick(t0 + secs(300), &mut surface).weather_refreshed);
        assert_eq!(sched.dashboard().time_label, "02:07");
        assert_eq!(sched.clock_at(t0 + secs(360)), ClockState { hour: 14, minute: 8 });
    }

    #[test]
    fn loading_wraps_fetch_and_present_follows() {
        let (mut sched, _) = scheduler();
        let mut surface = RecordingSurface::default();
        let t0 = Instant::now();
        sched.start(t0, &mut surface);
        sched.tick(t0 + secs(30), &mut surface);
        sched.tick(t0 + secs(60), &mut surface);

        assert_eq!(
            surface.events,
            vec![
                Event::Loading(true),
                Event::Loading(false),
                Event::Present("02:07".to_string()),
                Event::Present("02:08".to_string()),
            ]
        );
    }

    #[test]
    fn failed_fetch_shows_fallback_and_clears_loading() {
        let source = WeatherSource::new(BrokenSource);
        let mut sched = RefreshScheduler::new(source, Intervals::default(), 0);
        let mut surface = RecordingSurface::default();
        sched.start(Instant::now(), &mut surface);

        assert_eq!(sched.reading(), &WeatherReading::fallback());
        assert_eq!(sched.dashboard().temp_label, "70°F");
        assert_eq!(sched.dashboard().time_label, "12:00");
        assert_eq!(
            surface.events,
            vec![
                Event::Loading(true),
                Event::Loading(false),
                Event::Present("12:00".to_string()),
            ]
        );
    }

    #[test]
    fn custom_intervals_are_respected() {
        let fetches = Rc::new(Cell::new(0));
        let source = WeatherSource::new(CountingSource {
            fetches: fetches.clone(),
            inner: FixtureSource::bundled(),
        });
        let intervals = Intervals {
            weather: secs(10),
            clock: secs(5),
        };
        let mut sched = RefreshScheduler::new(source, intervals, 0);
        let mut surface = RecordingSurface::default();
        let t0 = Instant::now();
        sched.start(t0, &mut surface);

        for t in 1..=30 {
            sched.tick(t0 + secs(t), &mut surface);
        }
        assert_eq!(fetches.get(), 4);
    }
}
