//! Configuração do switch
//!
//! Carregada de um arquivo JSON ou de variáveis de ambiente (`.env`
//! incluído). Imutável durante a vida da máquina de estados.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SwitchError, SwitchResult};
use crate::types::{Angle, Pin, Position, SERVO_MAX_DEG, SERVO_MIN_DEG};

/// Atrasos de cada fase (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingProfile {
    /// Espera o servo chegar ao neutro após o boot
    pub init_ms: u64,
    /// Estabilização após ligar o sinal
    pub attach_ms: u64,
    /// Tempo segurando a posição de acionamento
    pub engage_ms: u64,
    /// Tempo para voltar ao neutro
    pub return_ms: u64,
    /// Estabilização após desligar o sinal
    pub detach_ms: u64,
}

impl TimingProfile {
    pub fn init(&self) -> Duration {
        Duration::from_millis(self.init_ms)
    }

    pub fn attach(&self) -> Duration {
        Duration::from_millis(self.attach_ms)
    }

    pub fn engage(&self) -> Duration {
        Duration::from_millis(self.engage_ms)
    }

    pub fn return_to_neutral(&self) -> Duration {
        Duration::from_millis(self.return_ms)
    }

    pub fn detach(&self) -> Duration {
        Duration::from_millis(self.detach_ms)
    }

    /// Duração de um ciclo completo a partir do comando aceito
    pub fn cycle(&self) -> Duration {
        self.attach() + self.engage() + self.return_to_neutral() + self.detach()
    }
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self {
            init_ms: 2000,
            attach_ms: 250,
            engage_ms: 250,
            return_ms: 250,
            detach_ms: 250,
        }
    }
}

/// Capacidades opcionais sobre o mesmo ciclo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Modo de calibração (`set_manual_pos`)
    pub manual_mode: bool,
    /// Guarda a última posição acionada mesmo após voltar ao neutro
    pub latest_tracking: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            manual_mode: true,
            latest_tracking: true,
        }
    }
}

/// Configuração completa de uma instância
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Nome (para logs)
    pub name: String,
    /// Pino de controle
    pub pin: u8,
    /// Ângulo de repouso
    pub neutral_deg: i32,
    /// Ângulo de acionamento superior
    pub top_deg: i32,
    /// Ângulo de acionamento inferior
    pub bottom_deg: i32,
    pub timing: TimingProfile,
    pub capabilities: Capabilities,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            name: "switch".to_string(),
            pin: 6,
            neutral_deg: 90,
            top_deg: 135,
            bottom_deg: 49,
            timing: TimingProfile::default(),
            capabilities: Capabilities::default(),
        }
    }
}

impl SwitchConfig {
    /// Cria configuração com pino e ângulos; demais campos no padrão
    pub fn new(pin: u8, neutral_deg: i32, top_deg: i32, bottom_deg: i32) -> Self {
        Self {
            pin,
            neutral_deg,
            top_deg,
            bottom_deg,
            ..Default::default()
        }
    }

    pub fn with_timing(mut self, timing: TimingProfile) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Valida ângulos
    pub fn validate(&self) -> SwitchResult<()> {
        for (field, deg) in [
            ("neutral_deg", self.neutral_deg),
            ("top_deg", self.top_deg),
            ("bottom_deg", self.bottom_deg),
        ] {
            if Angle::try_from_deg(deg).is_none() {
                return Err(SwitchError::InvalidConfig(format!(
                    "{} must be {}-{}°, got {}°",
                    field, SERVO_MIN_DEG, SERVO_MAX_DEG, deg
                )));
            }
        }

        if self.top_deg == self.neutral_deg {
            return Err(SwitchError::InvalidConfig(
                "top_deg must differ from neutral_deg".into(),
            ));
        }
        if self.bottom_deg == self.neutral_deg {
            return Err(SwitchError::InvalidConfig(
                "bottom_deg must differ from neutral_deg".into(),
            ));
        }

        Ok(())
    }

    pub fn pin(&self) -> Pin {
        Pin(self.pin)
    }

    /// Ângulo configurado para uma posição semântica
    pub fn angle_for(&self, position: Position) -> SwitchResult<Angle> {
        let deg = match position {
            Position::Neutral => self.neutral_deg,
            Position::Top => self.top_deg,
            Position::Bottom => self.bottom_deg,
        };
        Angle::new(deg)
    }

    /// Carrega de um arquivo JSON
    pub fn load(path: impl AsRef<Path>) -> SwitchResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: SwitchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded switch configuration");
        Ok(config)
    }

    /// Carrega do ambiente (e de `.env`, se existir)
    pub fn from_env() -> SwitchResult<Self> {
        let _ = dotenv::dotenv();

        let mut config = SwitchConfig::default();
        if let Ok(name) = env::var("SWITCH_NAME") {
            config.name = name;
        }
        override_from_env("SWITCH_PIN", &mut config.pin);
        override_from_env("SWITCH_NEUTRAL_DEG", &mut config.neutral_deg);
        override_from_env("SWITCH_TOP_DEG", &mut config.top_deg);
        override_from_env("SWITCH_BOTTOM_DEG", &mut config.bottom_deg);
        override_from_env("SWITCH_INIT_MS", &mut config.timing.init_ms);
        override_from_env("SWITCH_ATTACH_MS", &mut config.timing.attach_ms);
        override_from_env("SWITCH_ENGAGE_MS", &mut config.timing.engage_ms);
        override_from_env("SWITCH_RETURN_MS", &mut config.timing.return_ms);
        override_from_env("SWITCH_DETACH_MS", &mut config.timing.detach_ms);
        override_from_env("SWITCH_MANUAL_MODE", &mut config.capabilities.manual_mode);
        override_from_env(
            "SWITCH_LATEST_TRACKING",
            &mut config.capabilities.latest_tracking,
        );

        config.validate()?;
        Ok(config)
    }
}

/// Sobrescreve `slot` se a variável existir e for parseável
fn override_from_env<T: std::str::FromStr>(key: &str, slot: &mut T) {
    if let Ok(raw) = env::var(key) {
        match raw.trim().parse() {
            Ok(value) => *slot = value,
            Err(_) => tracing::warn!(key, value = %raw, "Ignoring unparsable environment value"),
        }
    }
}
