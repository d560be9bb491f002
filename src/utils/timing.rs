use std::fmt;
use std::time::{Duration, Instant, SystemTime};

/// Estrutura para representar timestamps com precisão
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    /// Número de microssegundos desde o UNIX epoch
    microseconds: u64,
}

impl Timestamp {
    /// Cria um novo timestamp a partir do tempo do sistema
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0));

        Self {
            microseconds: now.as_micros() as u64,
        }
    }

    /// Retorna a diferença em duração entre dois timestamps
    pub fn duration_since(&self, earlier: &Self) -> Duration {
        Duration::from_micros(self.microseconds.saturating_sub(earlier.microseconds))
    }

    /// Converte para DateTime do Chrono
    pub fn to_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        let secs = (self.microseconds / 1_000_000) as i64;
        let nsecs = ((self.microseconds % 1_000_000) * 1000) as u32;

        chrono::DateTime::from_timestamp(secs, nsecs).unwrap_or_else(chrono::Utc::now)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y-%m-%d %H:%M:%S%.6f"))
    }
}

/// Mede o tempo de processamento de um frame
pub struct ExecutionTimer {
    start: Instant,
    name: String,
}

impl ExecutionTimer {
    /// Cria um novo timer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Encerra o timer, avisando se o orçamento do frame foi excedido
    pub fn stop(self, budget: Duration) -> Duration {
        let duration = self.start.elapsed();
        if duration > budget {
            log::warn!(
                "{} excedeu o orçamento do frame: {:?} > {:?}",
                self.name,
                duration,
                budget
            );
        } else {
            log::trace!("{} executou em {:?}", self.name, duration);
        }
        duration
    }
}
