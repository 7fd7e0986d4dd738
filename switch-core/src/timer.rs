//! # ⏱️ Timer — Prazo Monotônico
//!
//! Contagem regressiva não bloqueante usada pela máquina de estados para
//! liberar as transições de fase. Nada aqui dorme: cada consulta apenas
//! compara uma leitura do relógio com o prazo armado.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// ═══════════════════════════════════════════════════════════════════════════════
// RELÓGIOS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fonte de tempo monotônica.
///
/// `now()` é a distância desde uma origem fixa arbitrária e nunca diminui.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Relógio real, baseado em [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Relógio controlado manualmente (testes, simulação).
///
/// Clones compartilham o mesmo contador, então quem segura um clone avança
/// o tempo visto pela máquina.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Avança o relógio
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Avança o relógio em milissegundos
    pub fn advance_ms(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// Posiciona o relógio; ignorado se andaria para trás
    pub fn set(&self, at: Duration) {
        self.millis
            .fetch_max(at.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRAZO
// ═══════════════════════════════════════════════════════════════════════════════

/// Prazo armado ("instante de disparo") sobre um [`Clock`].
#[derive(Debug, Clone)]
pub struct DeadlineTimer<C: Clock> {
    clock: C,
    deadline: Option<Duration>,
}

impl<C: Clock> DeadlineTimer<C> {
    /// Cria timer desarmado
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            deadline: None,
        }
    }

    /// Arma `now + duration`, somente se ainda desarmado.
    ///
    /// Chamadas repetidas enquanto armado não empurram o prazo.
    pub fn start(&mut self, duration: Duration) {
        if self.deadline.is_none() {
            self.deadline = Some(self.clock.now() + duration);
        }
    }

    /// Rearma incondicionalmente
    pub fn restart(&mut self, duration: Duration) {
        self.deadline = Some(self.clock.now() + duration);
    }

    /// O prazo já passou? Desarmado nunca expira. Não desarma.
    pub fn elapsed(&self) -> bool {
        match self.deadline {
            Some(deadline) => self.clock.now() >= deadline,
            None => false,
        }
    }

    /// Desarma
    pub fn reset(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Tempo restante até o prazo (zero se já expirou)
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_sub(self.clock.now()))
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disarmed_never_elapses() {
        let clock = ManualClock::new();
        let timer = DeadlineTimer::new(clock.clone());
        clock.advance_ms(10_000);
        assert!(!timer.elapsed());
        assert!(!timer.is_armed());
        assert_eq!(timer.remaining(), None);
    }

    #[test]
    fn test_elapses_at_deadline() {
        let clock = ManualClock::new();
        let mut timer = DeadlineTimer::new(clock.clone());
        timer.start(Duration::from_millis(250));

        clock.advance_ms(249);
        assert!(!timer.elapsed());
        assert_eq!(timer.remaining(), Some(Duration::from_millis(1)));

        clock.advance_ms(1);
        assert!(timer.elapsed());
        // Consulta idempotente
        assert!(timer.elapsed());
        assert!(timer.is_armed());
    }

    #[test]
    fn test_start_does_not_push_deadline() {
        let clock = ManualClock::new();
        let mut timer = DeadlineTimer::new(clock.clone());
        timer.start(Duration::from_millis(100));
        clock.advance_ms(60);
        timer.start(Duration::from_millis(100));
        clock.advance_ms(40);
        assert!(timer.elapsed());
    }

    #[test]
    fn test_restart_and_reset() {
        let clock = ManualClock::new();
        let mut timer = DeadlineTimer::new(clock.clone());
        timer.start(Duration::from_millis(100));
        clock.advance_ms(60);
        timer.restart(Duration::from_millis(100));
        clock.advance_ms(40);
        assert!(!timer.elapsed());

        timer.reset();
        clock.advance_ms(1_000);
        assert!(!timer.elapsed());
    }

    #[test]
    fn test_zero_duration_elapses_immediately() {
        let mut timer = DeadlineTimer::new(ManualClock::new());
        timer.start(Duration::ZERO);
        assert!(timer.elapsed());
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new();
        clock.set(Duration::from_millis(500));
        clock.set(Duration::from_millis(100));
        assert_eq!(clock.now(), Duration::from_millis(500));
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
