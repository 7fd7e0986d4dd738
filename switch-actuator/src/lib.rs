//! # 🦾 switch-actuator — Atuador do Interruptor
//!
//! Drivers de servo e a máquina de estados temporizada que aciona uma tecla
//! de parede: liga o servo, empurra para cima ou para baixo, volta ao neutro
//! e desliga, tudo sem bloquear.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Transporte / loop de controle (host)   │
//! │   set_pos() · tick() · has_position_… │
//! └─────────────────────────────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────────┐
//! │         ServoStateMachine               │
//! │  Init → Idle → Attached → Engaging →    │
//! │  Returning → Detached → Idle  (Manual)  │
//! └─────────────────────────────────────────┘
//!          ↓                     ↓
//!   ServoDriver trait      DeadlineTimer<Clock>
//!   ┌─────────────┐
//!   │ServoActuator│ (simulado)
//!   │  PwmServo   │ (embedded-hal)
//!   └─────────────┘
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use switch_actuator::{ServoActuator, ServoStateMachine};
//! use switch_core::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let clock = ManualClock::new();
//! let config = SwitchConfig::new(6, 90, 135, 49);
//! let mut switch = ServoStateMachine::new(config, ServoActuator::new(), clock.clone())?;
//!
//! switch.setup();
//! clock.advance_ms(2000);
//! switch.tick();
//! assert_eq!(switch.phase(), Phase::Idle);
//!
//! assert!(switch.set_pos(Position::Top));
//! switch.tick();
//! clock.advance_ms(250);
//! switch.tick();
//! assert_eq!(switch.current_position(), Position::Top);
//! assert!(switch.has_position_changed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Garantias
//!
//! - Servo energizado somente em `Attached`, `Engaging`, `Returning` e `Manual`
//! - Um ciclo por vez: comandos fora de `Idle`/`Manual` retornam `false`
//! - `has_position_changed()` é consumido na leitura

pub mod machine;
pub mod pwm;
pub mod servo;

pub use machine::{ServoStateMachine, SwitchState};
pub use pwm::PwmServo;
pub use servo::{ServoActuator, ServoEvent, ServoState};
