//! # 🎯 Traits — Costuras do Sistema
//!
//! | Trait | Papel | Implementações |
//! |:------|:------|:---------------|
//! | [`SwitchComponent`] | Base (nome, versão) | todos |
//! | [`ServoDriver`] | Driver do atuador | `switch-actuator` |
//! | [`Clock`](crate::timer::Clock) | Fonte de tempo | [`timer`](crate::timer) |
//!
//! ## Princípio de Design
//!
//! > *"Trait no core, implementação no módulo."*

use std::fmt::Debug;

use crate::types::{Angle, Pin};

// ═══════════════════════════════════════════════════════════════════════════════
// TRAIT BASE
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait base para qualquer componente do switch.
///
/// # Exemplo
///
/// ```
/// use switch_core::traits::SwitchComponent;
///
/// #[derive(Debug)]
/// struct Relay;
///
/// impl SwitchComponent for Relay {
///     fn name(&self) -> &str { "relay" }
/// }
///
/// assert!(Relay.is_ready());
/// ```
pub trait SwitchComponent: Send + Debug {
    /// Nome único do componente (para logs e debug)
    fn name(&self) -> &str;

    /// Versão do componente (para compatibilidade)
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Componente está pronto para uso?
    fn is_ready(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATUADOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Driver de servo de baixo nível.
///
/// O driver é um sorvedouro de comandos: nada retorna erro. Implementações
/// que falam com hardware registram falhas via `tracing` e seguem em frente.
///
/// # Exemplo
///
/// ```
/// use switch_core::traits::{ServoDriver, SwitchComponent};
/// use switch_core::types::{Angle, Pin};
///
/// #[derive(Debug, Default)]
/// struct Horn {
///     pin: Option<Pin>,
///     angle: Option<Angle>,
/// }
///
/// impl SwitchComponent for Horn {
///     fn name(&self) -> &str { "horn" }
/// }
///
/// impl ServoDriver for Horn {
///     fn attach(&mut self, pin: Pin) { self.pin = Some(pin); }
///     fn detach(&mut self) { self.pin = None; }
///     fn write(&mut self, angle: Angle) { self.angle = Some(angle); }
///     fn is_attached(&self) -> bool { self.pin.is_some() }
/// }
///
/// let mut horn = Horn::default();
/// horn.attach(Pin(6));
/// horn.write(Angle::new(90).unwrap());
/// assert!(horn.is_attached());
/// ```
pub trait ServoDriver: SwitchComponent {
    /// Liga o sinal de controle no pino
    fn attach(&mut self, pin: Pin);

    /// Desliga o sinal de controle (sem torque, sem jitter)
    fn detach(&mut self);

    /// Comanda um ângulo
    fn write(&mut self, angle: Angle);

    /// Sinal de controle ligado?
    fn is_attached(&self) -> bool;
}
