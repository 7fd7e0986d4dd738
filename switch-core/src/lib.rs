//! # 💡 switch-core
//!
//! Base do switch acionado por servo: um servo de hobby empurra uma tecla
//! de parede para cima ou para baixo e volta ao repouso, ficando desligado
//! enquanto ocioso.
//!
//! ## Módulos
//!
//! - [`types`]: `Position`, `Phase`, `Angle`, `Pin`
//! - [`traits`]: `SwitchComponent`, `ServoDriver`
//! - [`timer`]: `Clock`, `DeadlineTimer` e relógios
//! - [`config`]: `SwitchConfig`, `TimingProfile`, `Capabilities`
//! - [`error`]: `SwitchError`
//!
//! A máquina de estados e os drivers concretos vivem em `switch-actuator`.
//!
//! ## Quick Start
//!
//! ```
//! use switch_core::prelude::*;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut timer = DeadlineTimer::new(clock.clone());
//! timer.start(Duration::from_millis(250));
//!
//! clock.advance_ms(250);
//! assert!(timer.elapsed());
//!
//! let config = SwitchConfig::default();
//! assert_eq!(config.angle_for(Position::Top).unwrap().degrees(), 135);
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod timer;
pub mod traits;
pub mod types;

pub use config::{Capabilities, SwitchConfig, TimingProfile};
pub use error::{SwitchError, SwitchResult};
pub use timer::{Clock, DeadlineTimer, ManualClock, MonotonicClock};
pub use traits::{ServoDriver, SwitchComponent};
pub use types::{Angle, Phase, Pin, Position, SERVO_MAX_DEG, SERVO_MIN_DEG};
