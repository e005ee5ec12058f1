//! Per-system timing.
//!
//! Every scheduled system is wrapped by [`profile`], which records how long it ran into a fixed
//! window of recent samples. `Game::tick` uses the window to name the culprits of a slow frame.

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bevy_ecs::system::IntoSystem;
use bevy_ecs::{resource::Resource, system::System, world::World};
use circular_buffer::CircularBuffer;
use num_width::NumberWidth;
use parking_lot::Mutex;
use smallvec::SmallVec;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};
use thousands::Separable;

const MAX_SYSTEMS: usize = SystemId::COUNT;
/// Number of recent samples kept per system.
const TIMING_WINDOW_SIZE: usize = 30;
/// A single system running this long is reported on its own.
const SLOW_SYSTEM: Duration = Duration::from_millis(2);

/// Recent durations of one system. Ticks it skipped count as zero.
#[derive(Debug, Default)]
pub struct TimingBuffer {
    samples: CircularBuffer<TIMING_WINDOW_SIZE, Duration>,
    last_tick: u64,
}

impl TimingBuffer {
    fn pad_to(&mut self, tick: u64) {
        let skipped = tick.saturating_sub(self.last_tick).saturating_sub(1);
        for _ in 0..skipped.min(TIMING_WINDOW_SIZE as u64) {
            self.samples.push_back(Duration::ZERO);
        }
    }

    /// Records a sample for `tick`. Samples from an older tick than the last one are dropped.
    pub fn add_timing(&mut self, duration: Duration, tick: u64) {
        if tick < self.last_tick {
            return;
        }
        self.pad_to(tick);
        self.samples.push_back(duration);
        self.last_tick = tick;
    }

    pub fn latest(&self) -> Duration {
        self.samples.back().copied().unwrap_or(Duration::ZERO)
    }

    /// Mean and sample standard deviation of the window (Welford).
    pub fn stats(&self) -> (Duration, Duration) {
        let mut count = 0u32;
        let mut mean = 0.0f64;
        let mut m2 = 0.0f64;
        for sample in self.samples.iter() {
            let x = sample.as_secs_f64();
            count += 1;
            let delta = x - mean;
            mean += delta / count as f64;
            m2 += delta * (x - mean);
        }

        match count {
            0 => (Duration::ZERO, Duration::ZERO),
            1 => (Duration::from_secs_f64(mean), Duration::ZERO),
            n => (
                Duration::from_secs_f64(mean),
                Duration::from_secs_f64((m2 / (n - 1) as f64).sqrt()),
            ),
        }
    }
}

/// Frame counter shared by every profiled system.
#[derive(Resource, Debug, Default)]
pub struct Timing {
    current_tick: AtomicU64,
}

impl Timing {
    pub fn current_tick(&self) -> u64 {
        self.current_tick.load(Ordering::Relaxed)
    }

    /// Increments the tick counter and returns the new value
    pub fn increment_tick(&self) -> u64 {
        self.current_tick.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(EnumCount, EnumIter, IntoStaticStr, Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum SystemId {
    Total,
    Input,
    PlayerInput,
    Session,
    Animation,
    Hitbox,
    SwordCollision,
    ProjectileMovement,
    PowerupLifetime,
    PowerupClick,
    PlayerActions,
    Stage,
    Spawner,
    PowerupSpawner,
    Hud,
    Audio,
    Errors,
}

impl Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<&'static str>::into(self).to_ascii_lowercase())
    }
}

#[derive(Resource, Debug)]
pub struct SystemTimings {
    timings: micromap::Map<SystemId, Mutex<TimingBuffer>, MAX_SYSTEMS>,
}

impl Default for SystemTimings {
    fn default() -> Self {
        let mut timings = micromap::Map::new();
        for id in SystemId::iter() {
            timings.insert(id, Mutex::new(TimingBuffer::default()));
        }
        Self { timings }
    }
}

impl SystemTimings {
    pub fn add_timing(&self, id: SystemId, duration: Duration, tick: u64) {
        if let Some(buffer) = self.timings.get(&id) {
            buffer.lock().add_timing(duration, tick);
        }
    }

    pub fn stats(&self, id: SystemId) -> (Duration, Duration) {
        self.timings
            .get(&id)
            .map(|buffer| buffer.lock().stats())
            .unwrap_or((Duration::ZERO, Duration::ZERO))
    }

    /// Systems likely responsible for a slow frame, slowest first.
    ///
    /// Anything over two milliseconds on the latest tick is reported outright. Otherwise the
    /// slowest systems are taken until they cover 30% of the frame, at most five.
    pub fn slowest_systems(&self) -> SmallVec<[(SystemId, Duration); 5]> {
        let mut latest: SmallVec<[(SystemId, Duration); MAX_SYSTEMS]> = self
            .timings
            .iter()
            .filter(|(id, _)| **id != SystemId::Total)
            .map(|(id, buffer)| (*id, buffer.lock().latest()))
            .collect();
        latest.sort_by(|a, b| b.1.cmp(&a.1));

        let over: SmallVec<[(SystemId, Duration); 5]> = latest
            .iter()
            .filter(|(_, duration)| *duration >= SLOW_SYSTEM)
            .take(5)
            .copied()
            .collect();
        if !over.is_empty() {
            return over;
        }

        let total: Duration = latest.iter().map(|(_, duration)| *duration).sum();
        let threshold = total.mul_f64(0.3);
        let mut covered = Duration::ZERO;
        let mut result = SmallVec::new();
        for (id, duration) in latest.iter().take(5) {
            result.push((*id, *duration));
            covered += *duration;
            if covered >= threshold {
                break;
            }
        }
        result
    }

    /// One aligned `name  mean ± deviation` line per system, most expensive first, headed by
    /// the effective frame rate.
    pub fn summary(&self) -> Vec<String> {
        let mut rows: Vec<(String, Duration, Duration)> = SystemId::iter()
            .filter(|id| *id != SystemId::Total)
            .map(|id| {
                let (mean, deviation) = self.stats(id);
                (id.to_string(), mean, deviation)
            })
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));

        let (total_mean, total_deviation) = self.stats(SystemId::Total);
        let fps = if total_mean.is_zero() {
            "-- FPS".to_string()
        } else {
            format!("{} FPS", ((1.0 / total_mean.as_secs_f64()) as u64).separate_with_commas())
        };
        rows.insert(0, (fps, total_mean, total_deviation));

        let name_width = rows.iter().map(|(name, _, _)| name.len()).max().unwrap_or(0);
        let micros = |d: &Duration| d.as_micros() as u64;
        let mean_width = rows.iter().map(|(_, mean, _)| micros(mean).width()).max().unwrap_or(1) as usize;
        let deviation_width = rows.iter().map(|(_, _, dev)| micros(dev).width()).max().unwrap_or(1) as usize;

        rows.iter()
            .map(|(name, mean, deviation)| {
                format!(
                    "{name:<name_width$}  {mean:>mean_width$}µs ± {deviation:>deviation_width$}µs",
                    mean = micros(mean),
                    deviation = micros(deviation),
                )
            })
            .collect()
    }
}

/// Wraps `system` so each run is timed under `id`.
pub fn profile<S, M>(id: SystemId, system: S) -> impl FnMut(&mut World)
where
    S: IntoSystem<(), (), M> + 'static,
{
    let mut system: S::System = IntoSystem::into_system(system);
    let mut is_initialized = false;
    move |world: &mut World| {
        if !is_initialized {
            system.initialize(world);
            is_initialized = true;
        }

        let start = Instant::now();
        system.run((), world);
        let duration = start.elapsed();

        if let (Some(timings), Some(timing)) = (world.get_resource::<SystemTimings>(), world.get_resource::<Timing>()) {
            timings.add_timing(id, duration, timing.current_tick());
        }
    }
}
