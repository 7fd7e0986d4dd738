//! # Prelude — Re-exportações Convenientes
//!
//! ```
//! use switch_core::prelude::*;
//! ```

// Tipos
pub use crate::types::{Angle, Phase, Pin, Position, SERVO_MAX_DEG, SERVO_MIN_DEG};

// Traits fundamentais
pub use crate::traits::{ServoDriver, SwitchComponent};

// Tempo
pub use crate::timer::{Clock, DeadlineTimer, ManualClock, MonotonicClock};

// Configuração e erros
pub use crate::config::{Capabilities, SwitchConfig, TimingProfile};
pub use crate::error::{SwitchError, SwitchResult};
