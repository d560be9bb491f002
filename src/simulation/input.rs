use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Botões do controle simulado (bitmask)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons(u8);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const START: Buttons = Buttons(1 << 0);
    pub const ACTION: Buttons = Buttons(1 << 1);

    pub fn contains(self, other: Buttons) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

/// Estado da entrada visível para as tarefas durante um frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// Botões segurados neste frame
    pub held: Buttons,
    /// Botões pressionados neste frame (borda de subida)
    pub pressed: Buttons,
}

impl InputState {
    /// Calcula o novo estado a partir dos botões segurados
    pub fn update(&mut self, held: Buttons) {
        self.pressed = Buttons(held.0 & !self.held.0);
        self.held = held;
    }
}

/// Gerador de entrada simulada
///
/// A cada frame, com a probabilidade configurada, segura um botão aleatório
/// por um único frame, produzindo uma borda de pressionamento.
pub struct InputSimulator {
    /// Probabilidade de pressionamento por frame (0.0 - 1.0)
    probability: f64,
    /// Gerador de números aleatórios
    rng: StdRng,
    /// Estado atual da entrada
    state: InputState,
}

impl InputSimulator {
    /// Cria um novo simulador de entrada
    pub fn new(probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            probability: probability.clamp(0.0, 1.0),
            rng,
            state: InputState::default(),
        }
    }

    /// Avança um frame e retorna o novo estado da entrada
    pub fn poll(&mut self) -> InputState {
        let held = if !self.state.held.is_empty() {
            // Soltar o botão do frame anterior
            Buttons::NONE
        } else if self.rng.gen_bool(self.probability) {
            if self.rng.gen_bool(0.5) {
                Buttons::START
            } else {
                Buttons::ACTION
            }
        } else {
            Buttons::NONE
        };

        self.state.update(held);
        if !self.state.pressed.is_empty() {
            log::trace!("Entrada simulada: {:?}", self.state.pressed);
        }
        self.state
    }
}
