use std::time::Duration;

use clap::Parser;

use escalonador_tarefas::kernel::Scheduler;
use escalonador_tarefas::simulation::{FrameClock, InputSimulator};
use escalonador_tarefas::tasks;
use escalonador_tarefas::utils::{ExecutionTimer, Timestamp, TraceWriter};

/// Simulação do escalonador de tarefas em árvore
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Quantidade de frames a simular
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Taxa de frames por segundo
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Arquivo CSV para o trace dos frames
    #[arg(short, long, default_value = "task_trace.csv")]
    trace_file: String,

    /// Capacidade do pool de tarefas
    #[arg(short, long, default_value_t = escalonador_tarefas::kernel::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Probabilidade de pressionar um botão a cada frame (0-100)
    #[arg(short, long, default_value_t = 2)]
    press_probability: u32,

    /// Semente do gerador de entrada simulada
    #[arg(short, long)]
    seed: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configurar logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Analisar argumentos
    let args = Args::parse();

    // Criar escalonador e estado compartilhado
    let mut scheduler = Scheduler::with_capacity(args.capacity);
    let state = tasks::shared_state();
    scheduler.set_root(tasks::title_task(state.clone()))?;

    let mut input = InputSimulator::new(args.press_probability as f64 / 100.0, args.seed);
    let mut clock = FrameClock::new(args.fps);
    let mut trace = TraceWriter::create(&args.trace_file)?;

    let started = Timestamp::now();
    log::info!("Simulação iniciada em {}", started);
    log::info!("Frames: {} a {} fps", args.frames, args.fps);
    log::info!("Arquivo de trace: {}", args.trace_file);

    let mut expirations = 0u64;
    let mut slowest = Duration::ZERO;

    for _ in 0..args.frames {
        let frame = clock.wait().await;

        // A entrada precisa estar visível para on_enter/on_tick deste frame
        state.borrow_mut().input = input.poll();

        let timer = ExecutionTimer::new(format!("Frame {}", frame));
        let report = match scheduler.run_once() {
            Ok(report) => report,
            Err(e) => {
                log::error!("Erro fatal no escalonador: {}", e);
                trace.flush()?;
                return Err(e.into());
            }
        };
        slowest = slowest.max(timer.stop(clock.period()));

        if let Some(expired) = &report.expired {
            expirations += 1;
            log::debug!("Frame {}: timer de \"{}\" expirou", report.frame, expired);
        }
        trace.record(&report, &scheduler)?;
    }

    trace.flush()?;

    let game = state.borrow();
    log::info!(
        "Simulação concluída: {} frames em {:.1?} ({:.1} fps medidos)",
        scheduler.frame(),
        Timestamp::now().duration_since(&started),
        clock.measured_fps()
    );
    log::info!(
        "Partidas: {}, demonstrações: {}, recorde: {}",
        game.games_played,
        game.demo_plays,
        game.high_score
    );
    log::info!(
        "Timers expirados: {}, frame mais lento: {:?}, tarefas vivas: {}/{}",
        expirations,
        slowest,
        scheduler.live_count(),
        scheduler.capacity()
    );

    Ok(())
}
