//! Tipos de dados do switch

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SwitchError, SwitchResult};

/// Ângulo mínimo aceito pelo servo (graus)
pub const SERVO_MIN_DEG: i32 = 0;
/// Ângulo máximo aceito pelo servo (graus)
pub const SERVO_MAX_DEG: i32 = 180;

/// Largura de pulso para 0° (µs)
pub const MIN_PULSE_US: u32 = 500;
/// Largura de pulso para 180° (µs)
pub const MAX_PULSE_US: u32 = 2500;

// ═══════════════════════════════════════════════════════════════════════════════
// POSIÇÃO SEMÂNTICA
// ═══════════════════════════════════════════════════════════════════════════════

/// Estado semântico do interruptor (não é um ângulo bruto).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Repouso, servo desligado
    #[default]
    Neutral,
    /// Aciona o lado de cima da tecla
    Top,
    /// Aciona o lado de baixo da tecla
    Bottom,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Neutral => "neutral",
            Position::Top => "top",
            Position::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = SwitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Position::Neutral),
            "top" => Ok(Position::Top),
            "bottom" => Ok(Position::Bottom),
            other => Err(SwitchError::InvalidPosition(format!(
                "expected neutral, top or bottom, got {:?}",
                other
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FASE DA MÁQUINA DE ESTADOS
// ═══════════════════════════════════════════════════════════════════════════════

/// Passo atual do ciclo temporizado.
///
/// ```text
/// Init → Idle → Attached → Engaging → Returning → Detached → Idle ...
///         ↕
///       Manual
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Init,
    Idle,
    Attached,
    Engaging,
    Returning,
    Detached,
    Manual,
}

impl Phase {
    /// Aceita novos comandos?
    pub fn is_quiescent(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    /// O servo deve estar energizado nesta fase?
    pub fn is_powered(&self) -> bool {
        matches!(
            self,
            Phase::Attached | Phase::Engaging | Phase::Returning | Phase::Manual
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Idle => "idle",
            Phase::Attached => "attached",
            Phase::Engaging => "engaging",
            Phase::Returning => "returning",
            Phase::Detached => "detached",
            Phase::Manual => "manual",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ÂNGULO E PINO
// ═══════════════════════════════════════════════════════════════════════════════

/// Ângulo de servo validado (0 a 180 graus, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Angle(u8);

impl Angle {
    /// Cria novo ângulo
    pub fn new(deg: i32) -> SwitchResult<Self> {
        Self::try_from_deg(deg).ok_or_else(|| {
            SwitchError::OutOfRange(format!(
                "Servo angle must be {}-{}°, got {}°",
                SERVO_MIN_DEG, SERVO_MAX_DEG, deg
            ))
        })
    }

    /// Versão sem erro: `None` fora do intervalo (sentinela de "sem override")
    pub fn try_from_deg(deg: i32) -> Option<Self> {
        if (SERVO_MIN_DEG..=SERVO_MAX_DEG).contains(&deg) {
            Some(Self(deg as u8))
        } else {
            None
        }
    }

    pub fn min() -> Self {
        Self(SERVO_MIN_DEG as u8)
    }

    pub fn max() -> Self {
        Self(SERVO_MAX_DEG as u8)
    }

    pub fn degrees(&self) -> u8 {
        self.0
    }

    /// Converte para largura de pulso (µs) padrão
    /// 0° = 500µs, 180° = 2500µs
    pub fn to_pulse_width_us(&self) -> u32 {
        MIN_PULSE_US + (self.0 as u32 * (MAX_PULSE_US - MIN_PULSE_US)) / SERVO_MAX_DEG as u32
    }
}

impl TryFrom<i32> for Angle {
    type Error = SwitchError;

    fn try_from(deg: i32) -> Result<Self, Self::Error> {
        Angle::new(deg)
    }
}

impl From<Angle> for i32 {
    fn from(angle: Angle) -> Self {
        angle.0 as i32
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Identificador do pino de controle do servo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(pub u8);

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin {}", self.0)
    }
}
