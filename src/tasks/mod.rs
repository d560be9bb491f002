pub mod game_over;
pub mod stage;
pub mod title;

use std::cell::RefCell;
use std::rc::Rc;

use crate::simulation::InputState;

/// Estado do jogo compartilhado entre as tarefas
#[derive(Debug, Clone, Default)]
pub struct GameState {
    /// Entrada do frame atual, atualizada antes de cada `run_once()`
    pub input: InputState,
    pub stage: u8,
    pub lives: u8,
    pub score: u32,
    pub high_score: u32,
    pub games_played: u32,
    pub demo_plays: u32,
    /// Frame em que a fase atual começou
    pub stage_started_at: u64,
    /// Marcado pela fase ao ser concluída, consumido pela partida
    pub stage_cleared: bool,
}

/// Estado compartilhado capturado pelas closures das tarefas
pub type SharedState = Rc<RefCell<GameState>>;

pub fn shared_state() -> SharedState {
    Rc::new(RefCell::new(GameState::default()))
}

pub use game_over::task as game_over_task;
pub use stage::{game_task, stage_task};
pub use title::{demo_task, task as title_task};
