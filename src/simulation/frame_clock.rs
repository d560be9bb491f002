use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Relógio de frames baseado em `tokio::time::interval`
///
/// Frames perdidos são descartados em vez de acumulados, como faria
/// um sinal de vblank.
pub struct FrameClock {
    interval: Interval,
    period: Duration,
    started_at: Instant,
    frames: u64,
}

impl FrameClock {
    /// Cria um relógio com a taxa de frames indicada
    pub fn new(fps: u32) -> Self {
        let period = Duration::from_secs(1) / fps.max(1);
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            interval,
            period,
            started_at: Instant::now(),
            frames: 0,
        }
    }

    /// Aguarda o início do próximo frame
    pub async fn wait(&mut self) -> u64 {
        self.interval.tick().await;
        self.frames += 1;
        self.frames
    }

    /// Duração nominal de um frame
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tempo decorrido desde a criação do relógio
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Frames por segundo efetivos até agora
    pub fn measured_fps(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}
