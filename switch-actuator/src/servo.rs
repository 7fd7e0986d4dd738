//! Implementação de servo simulado

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use switch_core::traits::{ServoDriver, SwitchComponent};
use switch_core::types::{Angle, Pin};

/// Evento observado pelo servo, na ordem em que chegou
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServoEvent {
    Attached(Pin),
    Detached,
    Wrote(Angle),
}

/// Estado interno do servo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServoState {
    /// Sinal de controle ligado?
    pub attached: bool,
    /// Pino do último attach
    pub pin: Option<Pin>,
    /// Último ângulo comandado (mesmo desligado)
    pub commanded: Option<Angle>,
    /// Ângulo físico do braço (só muda com sinal ligado)
    pub horn: Option<Angle>,
    /// Largura de pulso emitida (µs), 0 sem sinal
    pub pulse_width_us: u32,
    pub attach_count: u64,
    pub detach_count: u64,
    pub write_count: u64,
    /// Histórico de eventos
    pub events: Vec<ServoEvent>,
}

impl ServoState {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&mut self, pin: Pin) {
        self.attached = true;
        self.pin = Some(pin);
        self.attach_count += 1;
        if let Some(angle) = self.commanded {
            self.drive(angle);
        }
        self.events.push(ServoEvent::Attached(pin));
    }

    fn detach(&mut self) {
        self.attached = false;
        self.pulse_width_us = 0;
        self.detach_count += 1;
        self.events.push(ServoEvent::Detached);
    }

    fn write(&mut self, angle: Angle) {
        self.commanded = Some(angle);
        self.write_count += 1;
        if self.attached {
            self.drive(angle);
        }
        // Manual repete o mesmo ângulo a cada tick
        if self.events.last() != Some(&ServoEvent::Wrote(angle)) {
            self.events.push(ServoEvent::Wrote(angle));
        }
    }

    /// Mock: movimento instantâneo
    fn drive(&mut self, angle: Angle) {
        self.horn = Some(angle);
        self.pulse_width_us = angle.to_pulse_width_us();
    }

    /// Reseta contadores e histórico, mantendo a posição física
    pub fn clear_history(&mut self) {
        self.attach_count = 0;
        self.detach_count = 0;
        self.write_count = 0;
        self.events.clear();
    }
}

/// Servo simulado.
///
/// Clones compartilham o mesmo estado: um clone mantido fora da máquina de
/// estados enxerga tudo o que a máquina comanda.
#[derive(Clone)]
pub struct ServoActuator {
    state: Arc<Mutex<ServoState>>,
    name: String,
}

impl std::fmt::Debug for ServoActuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServoActuator")
            .field("name", &self.name)
            .finish()
    }
}

impl ServoActuator {
    /// Cria novo servo
    pub fn new() -> Self {
        Self::named("servo")
    }

    /// Cria servo com nome
    pub fn named(name: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServoState::new())),
            name: name.to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ServoState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cópia do estado interno
    pub fn state(&self) -> ServoState {
        self.lock().clone()
    }

    /// Ângulo físico atual
    pub fn horn(&self) -> Option<Angle> {
        self.lock().horn
    }

    pub fn pulse_width_us(&self) -> u32 {
        self.lock().pulse_width_us
    }

    pub fn events(&self) -> Vec<ServoEvent> {
        self.lock().events.clone()
    }

    pub fn clear_history(&self) {
        self.lock().clear_history();
    }
}

impl Default for ServoActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchComponent for ServoActuator {
    fn name(&self) -> &str {
        &self.name
    }
}

impl ServoDriver for ServoActuator {
    fn attach(&mut self, pin: Pin) {
        self.lock().attach(pin);
    }

    fn detach(&mut self) {
        self.lock().detach();
    }

    fn write(&mut self, angle: Angle) {
        self.lock().write(angle);
    }

    fn is_attached(&self) -> bool {
        self.lock().attached
    }
}
