//! One-shot capability probe that picks the session's quality tier.
//!
//! Draws a burst of radial-gradient fills into a throwaway target, times it,
//! and combines the result with coarse hardware hints. Never fails: any
//! problem resolves to `Tier::Mid`.

use std::fmt;

use glam::Vec2;

use crate::api::types::Tier;
use crate::systems::effects::Color;

use super::traits::{Fill, Surface};

/// Number of gradient fills in the benchmark.
pub const PROBE_FILLS: usize = 120;

/// Assumed when the host does not report core count.
const DEFAULT_CORES: u32 = 4;
/// Assumed when the host does not report memory (GB).
const DEFAULT_MEMORY_GB: f32 = 4.0;

/// Errors from a probe run. All of them end in a `Tier::Mid` outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// No drawing target could be created.
    NoSurface,
    /// A fill was rejected by the target.
    Fill(String),
    /// The clock returned a non-finite or negative duration.
    BadTiming(f64),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::NoSurface => write!(f, "no probe surface available"),
            ProbeError::Fill(msg) => write!(f, "probe fill failed: {}", msg),
            ProbeError::BadTiming(ms) => write!(f, "probe timing unusable: {} ms", ms),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Drawing target for the benchmark. Fallible, unlike `Surface`, because
/// host contexts can reject gradient creation.
pub trait ProbeSurface {
    fn probe_fill(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) -> Result<(), ProbeError>;

    /// Force pending work to complete so the timing is honest.
    fn flush(&mut self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ProbeSurface for super::draw_list::DrawList {
    fn probe_fill(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) -> Result<(), ProbeError> {
        let stops = [(0.0, inner), (1.0, outer)];
        self.fill_circle(center, radius, &Fill::Glow(&stops));
        Ok(())
    }
}

/// Coarse host hints. `None` means the host did not report the value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HardwareHints {
    pub hardware_concurrency: Option<u32>,
    pub device_memory_gb: Option<f32>,
    pub reduced_motion: bool,
}

/// What the probe decided, for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    pub tier: Tier,
    pub score: u32,
    /// Benchmark duration; `None` when it was skipped or failed.
    pub elapsed_ms: Option<f64>,
}

impl ProbeOutcome {
    fn fallback() -> Self {
        Self { tier: Tier::Mid, score: 0, elapsed_ms: None }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityProbe {
    pub hints: HardwareHints,
}

impl CapabilityProbe {
    pub fn new(hints: HardwareHints) -> Self {
        Self { hints }
    }

    /// Run the probe. `clock` returns monotonic milliseconds.
    pub fn run<S, C>(&self, surface: Option<&mut S>, mut clock: C) -> ProbeOutcome
    where
        S: ProbeSurface + ?Sized,
        C: FnMut() -> f64,
    {
        if self.hints.reduced_motion {
            log::info!("reduced motion requested, using low tier");
            return ProbeOutcome { tier: Tier::Low, score: 0, elapsed_ms: None };
        }
        match self.measure(surface, &mut clock) {
            Ok(elapsed) => {
                let score = Self::benchmark_score(elapsed) + self.core_score() + self.memory_score();
                let tier = Self::tier_for_score(score);
                log::info!("capability probe: {:.1} ms, score {}, tier {}", elapsed, score, tier.as_str());
                ProbeOutcome { tier, score, elapsed_ms: Some(elapsed) }
            }
            Err(e) => {
                log::warn!("capability probe failed ({}), using mid tier", e);
                ProbeOutcome::fallback()
            }
        }
    }

    fn measure<S, C>(&self, surface: Option<&mut S>, clock: &mut C) -> Result<f64, ProbeError>
    where
        S: ProbeSurface + ?Sized,
        C: FnMut() -> f64,
    {
        let surface = surface.ok_or(ProbeError::NoSurface)?;
        let inner = Color::rgb(0.6, 0.7, 1.0);
        let outer = Color::TRANSPARENT;
        let start = clock();
        for i in 0..PROBE_FILLS {
            let x = (i % 12) as f32 * 16.0 + 8.0;
            let y = (i / 12) as f32 * 16.0 + 8.0;
            surface.probe_fill(Vec2::new(x, y), 6.0 + (i % 5) as f32 * 4.0, inner, outer)?;
        }
        surface.flush()?;
        let elapsed = clock() - start;
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(ProbeError::BadTiming(elapsed));
        }
        Ok(elapsed)
    }

    pub fn benchmark_score(elapsed_ms: f64) -> u32 {
        if elapsed_ms < 4.0 {
            3
        } else if elapsed_ms < 10.0 {
            2
        } else if elapsed_ms < 25.0 {
            1
        } else {
            0
        }
    }

    fn core_score(&self) -> u32 {
        let cores = match self.hints.hardware_concurrency {
            Some(n) if n > 0 => n,
            _ => DEFAULT_CORES,
        };
        match cores {
            8.. => 2,
            4.. => 1,
            _ => 0,
        }
    }

    fn memory_score(&self) -> u32 {
        let gb = match self.hints.device_memory_gb {
            Some(gb) if gb.is_finite() && gb > 0.0 => gb,
            _ => DEFAULT_MEMORY_GB,
        };
        if gb >= 8.0 {
            2
        } else if gb >= 4.0 {
            1
        } else {
            0
        }
    }

    pub fn tier_for_score(score: u32) -> Tier {
        match score {
            6.. => Tier::High,
            3.. => Tier::Mid,
            _ => Tier::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::draw_list::DrawList;

    /// Clock that advances `step` ms per call.
    fn ticking(step: f64) -> impl FnMut() -> f64 {
        let mut now = 0.0;
        move || {
            let t = now;
            now += step;
            t
        }
    }

    struct Broken;

    impl ProbeSurface for Broken {
        fn probe_fill(&mut self, _: Vec2, _: f32, _: Color, _: Color) -> Result<(), ProbeError> {
            Err(ProbeError::Fill("context lost".into()))
        }
    }

    fn strong() -> HardwareHints {
        HardwareHints { hardware_concurrency: Some(16), device_memory_gb: Some(16.0), reduced_motion: false }
    }

    #[test]
    fn fast_strong_machine_is_high() {
        let mut surface = DrawList::new(200.0, 200.0);
        let out = CapabilityProbe::new(strong()).run(Some(&mut surface), ticking(2.0));
        assert_eq!(out.tier, Tier::High);
        assert_eq!(out.score, 7);
        assert_eq!(surface.commands().len(), PROBE_FILLS);
    }

    #[test]
    fn slow_weak_machine_is_low() {
        let hints = HardwareHints { hardware_concurrency: Some(2), device_memory_gb: Some(2.0), reduced_motion: false };
        let mut surface = DrawList::new(200.0, 200.0);
        let out = CapabilityProbe::new(hints).run(Some(&mut surface), ticking(40.0));
        assert_eq!(out.tier, Tier::Low);
        assert_eq!(out.score, 0);
    }

    #[test]
    fn missing_hints_assume_midrange() {
        let mut surface = DrawList::new(200.0, 200.0);
        let out = CapabilityProbe::default().run(Some(&mut surface), ticking(15.0));
        // benchmark 1 + cores 1 + memory 1
        assert_eq!(out.score, 3);
        assert_eq!(out.tier, Tier::Mid);
    }

    #[test]
    fn reduced_motion_forces_low() {
        let hints = HardwareHints { reduced_motion: true, ..strong() };
        let mut surface = DrawList::new(200.0, 200.0);
        let out = CapabilityProbe::new(hints).run(Some(&mut surface), ticking(0.1));
        assert_eq!(out.tier, Tier::Low);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn failures_fall_back_to_mid() {
        let probe = CapabilityProbe::new(strong());
        assert_eq!(probe.run(None::<&mut DrawList>, ticking(1.0)).tier, Tier::Mid);
        assert_eq!(probe.run(Some(&mut Broken), ticking(1.0)).tier, Tier::Mid);
        let mut surface = DrawList::new(10.0, 10.0);
        let mut calls = 0;
        let nan_clock = move || {
            calls += 1;
            if calls > 1 { f64::NAN } else { 0.0 }
        };
        let out = probe.run(Some(&mut surface), nan_clock);
        assert_eq!(out, ProbeOutcome { tier: Tier::Mid, score: 0, elapsed_ms: None });
    }

    #[test]
    fn score_thresholds() {
        assert_eq!(CapabilityProbe::benchmark_score(3.9), 3);
        assert_eq!(CapabilityProbe::benchmark_score(4.0), 2);
        assert_eq!(CapabilityProbe::benchmark_score(24.9), 1);
        assert_eq!(CapabilityProbe::benchmark_score(25.0), 0);
        assert_eq!(CapabilityProbe::tier_for_score(6), Tier::High);
        assert_eq!(CapabilityProbe::tier_for_score(5), Tier::Mid);
        assert_eq!(CapabilityProbe::tier_for_score(2), Tier::Low);
    }

    #[test]
    fn error_messages() {
        assert_eq!(ProbeError::NoSurface.to_string(), "no probe surface available");
        assert!(ProbeError::Fill("x".into()).to_string().contains("x"));
    }
}
