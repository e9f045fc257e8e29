use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{debug, error, info};
use onboarding_core::{FlowBuilderInit, InMemoryRecordStore, QuestionnaireDefinition, RecordStore, SessionIdentity, UserId};
use onboarding_persistence::{build_pool_from_config, DbConfig, PersistenceError, PgRecordStore, PoolProvider};
use wellness_onboarding::{load_questionnaire, run_flow, AppConfig, AppError, RunOutcome};

#[derive(Parser, Debug)]
#[command(name = "onboarding-cli")]
#[command(about = "Cuestionario de onboarding multi-paso en la terminal")]
struct Cli {
    /// Usuario autenticado (UUID). Por defecto `ONBOARDING_USER_ID`.
    #[arg(long)]
    user: Option<UserId>,
    /// JSON con los pasos del cuestionario. Por defecto el cuestionario
    /// incluido.
    #[arg(long, value_name = "FILE")]
    questionnaire: Option<PathBuf>,
    /// Ignora `DATABASE_URL` y guarda las respuestas sólo en memoria.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(RunOutcome::Completed(receipt)) => {
            println!("\nThanks! {} answers saved for {}.", receipt.record_count, receipt.user_id);
        }
        Ok(RunOutcome::Exited) => println!("\nOnboarding closed; nothing was saved."),
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<RunOutcome, AppError> {
    let config = AppConfig::from_env()?.with_overrides(cli.user, cli.questionnaire, cli.in_memory);
    let definition = load_questionnaire(config.questionnaire_path.as_deref())?;
    let identity = Arc::new(match config.user_id {
                                Some(user) => SessionIdentity::authenticated(user),
                                None => SessionIdentity::anonymous(),
                            });

    match config.database_url {
        Some(url) => {
            // Diesel bloquea: el pool y el perfil se preparan fuera del runtime.
            let user = config.user_id;
            let store = tokio::task::spawn_blocking(move || -> Result<_, PersistenceError> {
                            let pool = build_pool_from_config(&DbConfig::new(url).pool_sizes_from_env())?;
                            let store = PgRecordStore::new(PoolProvider { pool });
                            if let Some(user) = user {
                                store.ensure_profile(user)?;
                            }
                            Ok(store)
                        }).await??;
            info!("usando Postgres como record store");
            run_with_store(definition, identity, store).await
        }
        None => {
            info!("DATABASE_URL no definido: usando store en memoria");
            run_with_store(definition, identity, InMemoryRecordStore::new()).await
        }
    }
}

async fn run_with_store<S: RecordStore>(definition: QuestionnaireDefinition,
                                        identity: Arc<SessionIdentity>,
                                        store: S)
                                        -> Result<RunOutcome, AppError> {
    let mut flow = FlowBuilderInit::new(definition).collaborators(Arc::clone(&identity), store)
                                                   .build();
    info!("onboarding:start flow_id={} steps={}", flow.flow_id(), flow.step_count());
    let outcome = run_flow(&mut flow, &identity).await;
    debug!("onboarding:events {:?}", flow.event_variants());
    outcome
}
