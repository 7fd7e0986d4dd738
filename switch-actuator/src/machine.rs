//! Máquina de estados de posição
//!
//! Sequencia energia do servo (attach/detach), movimento (write) e os
//! atrasos de estabilização. Avança no máximo uma fase por [`tick`].
//!
//! | Fase | Guarda → próxima fase |
//! |:-----|:----------------------|
//! | `Init` | `init` expira → detach, `Idle` |
//! | `Idle` | alvo ≠ neutro → attach, `Attached`; ângulo manual → attach, `Manual` |
//! | `Attached` | `attach` expira → write alvo, posição muda, `Engaging` |
//! | `Engaging` | `engage` expira → write neutro, `Returning` |
//! | `Returning` | `return` expira → detach, posição neutra, `Detached` |
//! | `Detached` | `detach` expira → alvo neutro, `Idle` |
//! | `Manual` | ângulo inválido → write neutro, detach, `Idle` |
//!
//! [`tick`]: ServoStateMachine::tick

use serde::{Deserialize, Serialize};
use switch_core::config::SwitchConfig;
use switch_core::error::SwitchResult;
use switch_core::timer::{Clock, DeadlineTimer};
use switch_core::traits::{ServoDriver, SwitchComponent};
use switch_core::types::{Angle, Phase, Position};

/// Retrato publicável do estado da máquina
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchState {
    pub phase: Phase,
    pub current: Position,
    pub latest: Position,
    pub target: Position,
    pub manual_deg: Option<Angle>,
}

/// Ângulos resolvidos na construção
#[derive(Debug, Clone, Copy)]
struct Angles {
    neutral: Angle,
    top: Angle,
    bottom: Angle,
}

impl Angles {
    fn engaged(&self, position: Position) -> Angle {
        match position {
            Position::Top => self.top,
            Position::Bottom => self.bottom,
            Position::Neutral => self.neutral,
        }
    }
}

/// Máquina de estados temporizada que aciona o interruptor.
pub struct ServoStateMachine<D: ServoDriver, C: Clock> {
    config: SwitchConfig,
    angles: Angles,
    driver: D,
    timer: DeadlineTimer<C>,
    phase: Phase,
    target: Position,
    current: Position,
    latest: Position,
    changed: bool,
    manual: Option<Angle>,
}

impl<D: ServoDriver, C: Clock> std::fmt::Debug for ServoStateMachine<D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServoStateMachine")
            .field("name", &self.config.name)
            .field("phase", &self.phase)
            .field("target", &self.target)
            .field("current", &self.current)
            .field("latest", &self.latest)
            .field("manual", &self.manual)
            .finish()
    }
}

impl<D: ServoDriver, C: Clock> ServoStateMachine<D, C> {
    /// Cria a máquina em `Init` sem tocar no servo; chame [`setup`](Self::setup).
    pub fn new(config: SwitchConfig, driver: D, clock: C) -> SwitchResult<Self> {
        config.validate()?;
        let angles = Angles {
            neutral: config.angle_for(Position::Neutral)?,
            top: config.angle_for(Position::Top)?,
            bottom: config.angle_for(Position::Bottom)?,
        };

        Ok(Self {
            config,
            angles,
            driver,
            timer: DeadlineTimer::new(clock),
            phase: Phase::Init,
            target: Position::Neutral,
            current: Position::Neutral,
            latest: Position::Neutral,
            changed: false,
            manual: None,
        })
    }

    /// Variante que já energiza o servo na construção
    pub fn started(config: SwitchConfig, driver: D, clock: C) -> SwitchResult<Self> {
        let mut machine = Self::new(config, driver, clock)?;
        machine.setup();
        Ok(machine)
    }

    /// Liga o servo no neutro e arma o atraso de `Init`.
    ///
    /// Retorna `false` se já foi chamado ou a máquina saiu de `Init`.
    pub fn setup(&mut self) -> bool {
        if self.phase != Phase::Init || self.timer.is_armed() {
            return false;
        }
        self.driver.attach(self.config.pin());
        self.driver.write(self.angles.neutral);
        self.timer.start(self.config.timing.init());
        tracing::info!(
            switch = %self.config.name,
            pin = self.config.pin,
            neutral = %self.angles.neutral,
            "Servo homing to neutral"
        );
        true
    }

    // ═══════════════════════════════════════════════════════════════════════
    // COMANDOS
    // ═══════════════════════════════════════════════════════════════════════

    /// Pede um ciclo até `position`.
    ///
    /// Aceito somente em `Idle` (ou `Manual`); fora disso é rejeitado sem
    /// efeito colateral. Não há fila: um segundo comando ainda em `Idle`
    /// sobrescreve o primeiro.
    pub fn set_pos(&mut self, position: Position) -> bool {
        if !matches!(self.phase, Phase::Idle | Phase::Manual) {
            tracing::trace!(switch = %self.config.name, phase = %self.phase, %position, "Rejected position command");
            return false;
        }
        self.manual = None;
        self.target = position;
        tracing::info!(switch = %self.config.name, %position, "Accepted position command");
        true
    }

    /// Calibração: dirige um ângulo bruto até receber um ângulo inválido.
    ///
    /// Em `Idle` só aceita ângulos válidos e sem ciclo pendente (entra em
    /// `Manual` no próximo tick). Em `Manual` aceita qualquer valor; fora de
    /// 0..=180 pede a saída para `Idle`.
    pub fn set_manual_pos(&mut self, degrees: i32) -> bool {
        if !self.config.capabilities.manual_mode {
            return false;
        }
        let angle = Angle::try_from_deg(degrees);
        let accepted = match self.phase {
            Phase::Idle => angle.is_some() && self.target == Position::Neutral,
            Phase::Manual => true,
            _ => false,
        };
        if accepted {
            self.manual = angle;
            tracing::debug!(switch = %self.config.name, degrees, "Manual angle set");
        } else {
            tracing::trace!(switch = %self.config.name, phase = %self.phase, degrees, "Rejected manual angle");
        }
        accepted
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PASSO
    // ═══════════════════════════════════════════════════════════════════════

    /// Avança no máximo uma fase. Não bloqueia.
    pub fn tick(&mut self) {
        match self.phase {
            Phase::Init => {
                if self.timer.elapsed() {
                    self.driver.detach();
                    self.enter(Phase::Idle);
                }
            }

            Phase::Idle => {
                if self.target != Position::Neutral {
                    self.manual = None;
                    self.driver.attach(self.config.pin());
                    self.timer.restart(self.config.timing.attach());
                    self.enter(Phase::Attached);
                } else if self.manual.is_some() {
                    self.driver.attach(self.config.pin());
                    self.enter(Phase::Manual);
                }
            }

            Phase::Attached => {
                if self.timer.elapsed() {
                    self.driver.write(self.angles.engaged(self.target));
                    self.set_current(self.target);
                    self.timer.restart(self.config.timing.engage());
                    self.enter(Phase::Engaging);
                }
            }

            Phase::Engaging => {
                if self.timer.elapsed() {
                    self.driver.write(self.angles.neutral);
                    self.timer.restart(self.config.timing.return_to_neutral());
                    self.enter(Phase::Returning);
                }
            }

            Phase::Returning => {
                if self.timer.elapsed() {
                    self.driver.detach();
                    self.set_current(Position::Neutral);
                    self.timer.restart(self.config.timing.detach());
                    self.enter(Phase::Detached);
                }
            }

            Phase::Detached => {
                if self.timer.elapsed() {
                    self.target = Position::Neutral;
                    self.enter(Phase::Idle);
                }
            }

            Phase::Manual => match self.manual {
                Some(angle) => self.driver.write(angle),
                None => {
                    self.driver.write(self.angles.neutral);
                    self.driver.detach();
                    self.enter(Phase::Idle);
                }
            },
        }
    }

    fn enter(&mut self, next: Phase) {
        if next == Phase::Idle {
            self.timer.reset();
        }
        tracing::debug!(switch = %self.config.name, from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
    }

    fn set_current(&mut self, position: Position) {
        self.current = position;
        if position != Position::Neutral {
            self.latest = position;
        }
        self.changed = true;
        tracing::info!(switch = %self.config.name, %position, "Position changed");
    }

    // ═══════════════════════════════════════════════════════════════════════
    // OBSERVAÇÃO
    // ═══════════════════════════════════════════════════════════════════════

    /// Última posição alcançada e estabilizada
    pub fn current_position(&self) -> Position {
        self.current
    }

    /// Última posição acionada, retida após voltar ao neutro.
    ///
    /// Sem `latest_tracking` é a própria posição atual.
    pub fn latest_position(&self) -> Position {
        if self.config.capabilities.latest_tracking {
            self.latest
        } else {
            self.current
        }
    }

    /// Verdadeiro no máximo uma vez por mudança: a leitura limpa o flag
    pub fn has_position_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target_position(&self) -> Position {
        self.target
    }

    pub fn manual_angle(&self) -> Option<Angle> {
        self.manual
    }

    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn clock(&self) -> &C {
        self.timer.clock()
    }

    pub fn snapshot(&self) -> SwitchState {
        SwitchState {
            phase: self.phase,
            current: self.current_position(),
            latest: self.latest_position(),
            target: self.target,
            manual_deg: self.manual,
        }
    }
}

impl<D: ServoDriver, C: Clock + Send> SwitchComponent for ServoStateMachine<D, C> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_ready(&self) -> bool {
        self.phase.is_quiescent()
    }
}
