//! Testes dos fluxos de demonstração dirigidos pelo escalonador

use escalonador_tarefas::kernel::Scheduler;
use escalonador_tarefas::simulation::{Buttons, InputSimulator};
use escalonador_tarefas::tasks::game_over::GAME_OVER_FRAMES;
use escalonador_tarefas::tasks::stage::{STAGE_COUNT, STARTING_LIVES};
use escalonador_tarefas::tasks::title::{ATTRACT_FRAMES, DEMO_FRAMES};
use escalonador_tarefas::tasks::{self, SharedState};
use escalonador_tarefas::utils::TraceWriter;

const FRAME_LIMIT: usize = 20_000;

fn frame(scheduler: &mut Scheduler, state: &SharedState, held: Buttons) {
    state.borrow_mut().input.update(held);
    scheduler.run_once().unwrap();
}

fn run_idle(scheduler: &mut Scheduler, state: &SharedState, frames: i32) {
    for _ in 0..frames {
        frame(scheduler, state, Buttons::NONE);
    }
}

fn run_until(scheduler: &mut Scheduler, state: &SharedState, name: &str) -> usize {
    for frames in 0..FRAME_LIMIT {
        if scheduler.current_name() == Some(name) {
            return frames;
        }
        frame(scheduler, state, Buttons::NONE);
    }
    panic!("\"{name}\" não foi alcançada em {FRAME_LIMIT} frames");
}

fn start_game() -> (Scheduler, SharedState) {
    let state = tasks::shared_state();
    let mut scheduler = Scheduler::new();
    scheduler.set_root(tasks::title_task(state.clone())).unwrap();

    frame(&mut scheduler, &state, Buttons::START);
    assert_eq!(scheduler.current_name(), Some("Partida"));
    (scheduler, state)
}

#[test]
fn idle_title_alternates_with_demo() {
    let state = tasks::shared_state();
    let mut scheduler = Scheduler::new();
    scheduler.set_root(tasks::title_task(state.clone())).unwrap();

    run_idle(&mut scheduler, &state, ATTRACT_FRAMES);
    assert_eq!(scheduler.current_name(), Some("Demonstração"));
    assert_eq!(state.borrow().demo_plays, 0);

    run_idle(&mut scheduler, &state, 1);
    assert_eq!(state.borrow().demo_plays, 1);

    run_idle(&mut scheduler, &state, DEMO_FRAMES - 1);
    assert_eq!(scheduler.current_name(), Some("Título"));
    assert_eq!(scheduler.live_count(), 1);
}

#[test]
fn any_button_interrupts_the_demo() {
    let state = tasks::shared_state();
    let mut scheduler = Scheduler::new();
    scheduler.set_root(tasks::demo_task(state.clone())).unwrap();

    run_idle(&mut scheduler, &state, 10);
    frame(&mut scheduler, &state, Buttons::ACTION);

    assert_eq!(scheduler.current_name(), Some("Título"));
}

#[test]
fn start_builds_the_stage_tree() {
    let (mut scheduler, state) = start_game();
    assert_eq!(scheduler.live_count(), 1);

    run_idle(&mut scheduler, &state, 1);

    let names: Vec<String> = scheduler.path().into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["Preparar", "Fase", "Partida"]);
    assert_eq!(state.borrow().lives, STARTING_LIVES);
    assert_eq!(state.borrow().games_played, 1);
    assert_eq!(state.borrow().stage_started_at, 1);
}

#[test]
fn idle_game_runs_out_of_lives() {
    let (mut scheduler, state) = start_game();

    run_until(&mut scheduler, &state, "Fim de Jogo");
    assert_eq!(state.borrow().lives, 0);
    assert_eq!(state.borrow().stage, 0);

    let frames = run_until(&mut scheduler, &state, "Título");
    assert!(frames <= GAME_OVER_FRAMES as usize + 1, "{frames}");
    assert_eq!(scheduler.live_count(), 1);
}

#[test]
fn start_skips_the_game_over_screen() {
    let (mut scheduler, state) = start_game();
    run_until(&mut scheduler, &state, "Fim de Jogo");

    frame(&mut scheduler, &state, Buttons::NONE);
    frame(&mut scheduler, &state, Buttons::START);

    assert_eq!(scheduler.current_name(), Some("Título"));
    assert_eq!(scheduler.live_count(), 1);
}

#[test]
fn clearing_every_stage_reaches_the_ending() {
    let (mut scheduler, state) = start_game();

    for _ in 0..FRAME_LIMIT {
        if scheduler.current_name() == Some("Final") {
            break;
        }
        let in_stage = scheduler.current_name() == Some("Fase");
        let was_held = state.borrow().input.held.contains(Buttons::ACTION);
        let held = if in_stage && !was_held {
            Buttons::ACTION
        } else {
            Buttons::NONE
        };
        frame(&mut scheduler, &state, held);
    }

    assert_eq!(scheduler.current_name(), Some("Final"));
    run_idle(&mut scheduler, &state, 1);

    let game = state.borrow();
    assert_eq!(game.stage, STAGE_COUNT);
    assert_eq!(game.lives, STARTING_LIVES);
    assert!(game.score > 0);
    assert_eq!(game.high_score, game.score);
}

#[test]
fn simulated_session_writes_trace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.csv");

    let state = tasks::shared_state();
    let mut scheduler = Scheduler::new();
    scheduler.set_root(tasks::title_task(state.clone())).unwrap();
    let mut input = InputSimulator::new(0.05, Some(1234));
    let mut trace = TraceWriter::create(&path).unwrap();

    for _ in 0..3_000 {
        state.borrow_mut().input = input.poll();
        let report = scheduler.run_once().unwrap();
        trace.record(&report, &scheduler).unwrap();
    }
    trace.flush().unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3_000);
    assert_eq!(&rows[0][0], "0");
    assert_eq!(&rows[2_999][0], "2999");
    assert!(rows.iter().all(|row| !row[1].is_empty()));
}
