use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chronos::{
    load_config_from_env, BuiltinContext, Command, CommandParser, CommandRegistry, ConfigError,
    DeltaCmdList, GameClock, GameConfig, InnHandle, PatronEnter, Scheduler, Transcript,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) struct AppWiring {
    pub(crate) parser: CommandParser,
    pub(crate) output: Transcript,
    pub(crate) clock: GameClock,
    pub(crate) quit_requested: Arc<AtomicBool>,
    pub(crate) inn_name: String,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Adventurer Startup ===");

    let config = load_config_from_env()?;
    Ok(wire(&config))
}

pub(crate) fn wire(config: &GameConfig) -> AppWiring {
    let clock = GameClock::starting_at(config.clock_start_seconds);
    let queue = Arc::new(DeltaCmdList::new());
    let inn = InnHandle::new(config.build_inn());
    let output = Transcript::new();
    let quit_requested = Arc::new(AtomicBool::new(false));
    let mut scheduler = Scheduler::new(Arc::clone(&queue), clock.clone());

    for patron in &config.patrons {
        let mut enter = PatronEnter::new(patron.arrive_after, patron.npc(), inn.clone())
            .leaving_after(config.patron_visit_seconds, Arc::clone(&queue));
        enter.set_output(output.clone());
        scheduler.sched(Box::new(enter));
    }
    info!(
        inn = %config.inn_name,
        patrons = config.patrons.len(),
        start = %clock.time_of_day(),
        "world_wired"
    );

    let registry = CommandRegistry::with_builtins(&BuiltinContext {
        inn,
        quit_requested: Arc::clone(&quit_requested),
        wait_seconds: config.default_wait_seconds,
    });

    AppWiring {
        parser: CommandParser::new(registry, scheduler, output.clone()),
        output,
        clock,
        quit_requested,
        inn_name: config.inn_name.clone(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
