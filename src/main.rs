use bomberbot::infra::{DefaultObserver, GameConnection};
use bomberbot::{EngineConfig, Game, RunnerConfig, StrategyPlanner};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bomberbot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging()?;

    let config = RunnerConfig::from_env()?;
    let engine_config = EngineConfig::from_env();
    info!("Engine config: {:?}", engine_config);

    let planner = match config.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StrategyPlanner::with_seed(engine_config, seed)
        }
        None => StrategyPlanner::new(engine_config),
    };

    let connection = GameConnection::new(config.base_url.clone(), config.auth_token.clone());
    let mut game = Game::new(connection, DefaultObserver, planner, config);
    game.run().await;
    Ok(())
}
