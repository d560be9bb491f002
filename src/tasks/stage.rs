use std::rc::Rc;

use super::{game_over, SharedState};
use crate::kernel::Task;
use crate::simulation::Buttons;

pub const STARTING_LIVES: u8 = 3;
/// Quantidade de fases de uma partida
pub const STAGE_COUNT: u8 = 3;
/// Duração da mensagem de preparação antes de cada fase
pub const READY_FRAMES: i32 = 60;
/// Tempo limite de uma fase; ao expirar, o jogador perde uma vida
pub const STAGE_FRAMES: i32 = 900;
/// Pressionamentos de ACTION necessários para concluir uma fase
pub const CLEAR_ACTIONS: u32 = 3;
/// Pontos por frame restante no timer ao concluir uma fase
pub const TIME_BONUS: u32 = 10;

/// Tarefa raiz de uma partida
///
/// O `on_tick` só roda quando a fase filha devolve o controle: decide entre
/// a próxima fase, uma nova tentativa ou o fim de jogo.
pub fn game_task(state: SharedState) -> Task {
    let enter_state = Rc::clone(&state);

    Task::new("Partida")
        .on_enter(move |ctx| {
            {
                let mut state = enter_state.borrow_mut();
                state.stage = 0;
                state.lives = STARTING_LIVES;
                state.score = 0;
                state.stage_cleared = false;
                state.games_played += 1;
            }
            log::info!("Partida iniciada com {} vidas", STARTING_LIVES);
            ctx.add_child(stage_task(Rc::clone(&enter_state)))?;
            Ok(())
        })
        .on_tick(move |ctx| {
            let (cleared, stage, lives) = {
                let mut state = state.borrow_mut();
                let cleared = std::mem::take(&mut state.stage_cleared);
                if cleared {
                    state.stage += 1;
                } else {
                    state.lives = state.lives.saturating_sub(1);
                }
                (cleared, state.stage, state.lives)
            };

            if cleared && stage >= STAGE_COUNT {
                log::info!("Todas as fases concluídas");
                ctx.add_next(game_over::task(Rc::clone(&state), true))?;
                ctx.next()?;
            } else if !cleared && lives == 0 {
                ctx.add_next(game_over::task(Rc::clone(&state), false))?;
                ctx.next()?;
            } else {
                if !cleared {
                    log::info!("Vida perdida, restam {}", lives);
                }
                ctx.add_child(stage_task(Rc::clone(&state)))?;
            }
            Ok(())
        })
}

/// Uma fase, executada como filha da partida
///
/// Começa com uma filha temporizada de preparação. O timer da fase corre
/// também durante a preparação.
pub fn stage_task(state: SharedState) -> Task {
    let enter_state = Rc::clone(&state);
    let mut actions = 0u32;

    Task::new("Fase")
        .with_timer(STAGE_FRAMES)
        .on_enter(move |ctx| {
            let stage = {
                let mut state = enter_state.borrow_mut();
                state.stage_started_at = ctx.frame();
                state.stage
            };
            log::info!("Fase {} - preparar (frame {})", stage + 1, ctx.frame());
            ctx.add_child(Task::new("Preparar").with_timer(READY_FRAMES))?;
            Ok(())
        })
        .on_tick(move |ctx| {
            let pressed = state.borrow().input.pressed;
            if !pressed.contains(Buttons::ACTION) {
                return Ok(());
            }

            actions += 1;
            if actions >= CLEAR_ACTIONS {
                let mut game = state.borrow_mut();
                game.stage_cleared = true;
                game.score += ctx.timer().max(0) as u32 * TIME_BONUS;
                log::info!("Fase {} concluída (pontos: {})", game.stage + 1, game.score);
                drop(game);
                ctx.next()?;
            }
            Ok(())
        })
}
