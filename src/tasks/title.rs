use std::rc::Rc;

use super::{stage, SharedState};
use crate::kernel::Task;
use crate::simulation::Buttons;

/// Frames na tela de título antes do modo demonstração
pub const ATTRACT_FRAMES: i32 = 300;
/// Duração da reprodução da demonstração
pub const DEMO_FRAMES: i32 = 600;

/// Tela de título
///
/// START inicia uma partida. Sem entrada, o timer expira e a demonstração
/// enfileirada no `on_enter` assume.
pub fn task(state: SharedState) -> Task {
    let queue_state = Rc::clone(&state);

    Task::new("Título")
        .with_timer(ATTRACT_FRAMES)
        .on_enter(move |ctx| {
            log::info!(
                "Tela de título (recorde: {})",
                queue_state.borrow().high_score
            );
            ctx.add_next(demo_task(Rc::clone(&queue_state)))?;
            Ok(())
        })
        .on_tick(move |ctx| {
            let pressed = state.borrow().input.pressed;
            if pressed.contains(Buttons::START) {
                log::info!("START pressionado, iniciando partida");
                ctx.set_root(stage::game_task(Rc::clone(&state)))?;
            }
            Ok(())
        })
}

/// Reprodução da demonstração, volta ao título ao terminar
pub fn demo_task(state: SharedState) -> Task {
    let queue_state = Rc::clone(&state);

    Task::new("Demonstração")
        .with_timer(DEMO_FRAMES)
        .on_enter(move |ctx| {
            let plays = {
                let mut state = queue_state.borrow_mut();
                state.demo_plays += 1;
                state.demo_plays
            };
            log::info!("Reproduzindo demonstração #{}", plays);
            ctx.add_next(task(Rc::clone(&queue_state)))?;
            Ok(())
        })
        .on_tick(move |ctx| {
            // Qualquer botão interrompe a demonstração
            let pressed = state.borrow().input.pressed;
            if !pressed.is_empty() {
                log::debug!("Demonstração interrompida pela entrada");
                ctx.next()?;
            }
            Ok(())
        })
}
