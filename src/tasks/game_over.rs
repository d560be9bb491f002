use std::rc::Rc;

use super::{title, SharedState};
use crate::kernel::Task;
use crate::simulation::Buttons;

/// Duração da tela de fim de jogo
pub const GAME_OVER_FRAMES: i32 = 180;

/// Tela de fim de jogo (ou final, quando `won`)
///
/// Volta ao título quando o timer expira; START pula direto para o título.
pub fn task(state: SharedState, won: bool) -> Task {
    let enter_state = Rc::clone(&state);
    let name = if won { "Final" } else { "Fim de Jogo" };

    Task::new(name)
        .with_timer(GAME_OVER_FRAMES)
        .on_enter(move |ctx| {
            let score = {
                let mut state = enter_state.borrow_mut();
                state.high_score = state.high_score.max(state.score);
                state.score
            };
            if won {
                log::info!("Parabéns! Pontuação final: {}", score);
            } else {
                log::info!("Fim de jogo. Pontuação: {}", score);
            }
            ctx.add_next(title::task(Rc::clone(&enter_state)))?;
            Ok(())
        })
        .on_tick(move |ctx| {
            let pressed = state.borrow().input.pressed;
            if pressed.contains(Buttons::START) {
                ctx.set_root(title::task(Rc::clone(&state)))?;
            }
            Ok(())
        })
}
