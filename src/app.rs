use crate::components::auth::{AuthAction, AuthState, AuthStore};
use crate::components::bootstrap::{BootstrapState, BootstrapStore};
use crate::components::commission::{CommissionAction, CommissionState, CommissionStore};
use crate::components::offers::{OffersAction, OffersState, OffersStore};
use crate::environment::repository::FileStore;
use crate::environment::{ApiError, Config, Environment, Repository};

/// The four slices, sharing one environment.
pub struct App {
    pub auth: AuthStore,
    pub bootstrap: BootstrapStore,
    pub offers: OffersStore,
    pub commission: CommissionStore,
}

impl App {
    pub fn new(environment: Environment) -> Self {
        Self {
            auth: AuthStore::new(AuthState::default(), environment.clone()),
            bootstrap: BootstrapStore::new(BootstrapState::default(), environment.clone()),
            offers: OffersStore::new(OffersState::default(), environment.clone()),
            commission: CommissionStore::new(CommissionState::default(), environment),
        }
    }

    /// Finishes bootstrapping and hands a stored token to the auth slice.
    pub async fn start(&mut self) {
        self.bootstrap.settle().await;
        if let Some(token) = self.bootstrap.state().restored_token.clone() {
            self.auth.run(AuthAction::RestoreSession(token)).await;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.bootstrap.state().is_ready
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.state().is_authenticated()
    }

    /// Loads the offer list and the commission plan side by side.
    pub async fn refresh(&mut self) {
        self.offers.send(OffersAction::FetchAll);
        self.commission.send(CommissionAction::FetchPlan);
        futures_util::join!(self.offers.settle(), self.commission.settle());
    }
}

pub fn init_logging() {
    use env_logger::Env;
    use std::io::Write;
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stdout)
        .try_init();
}

pub async fn run() -> Result<(), ApiError> {
    if let Err(e) = dotenvy::dotenv() {
        log::trace!("No .env file: {e}");
    }
    init_logging();

    let config = Config::from_env();
    let repository = Repository::new(FileStore::in_data_directory()?);
    let environment = Environment::new(config, repository)?;

    let mut app = App::new(environment);
    app.start().await;

    if !app.is_authenticated() {
        log::info!("Not signed in");
        return Ok(());
    }

    app.refresh().await;
    let offers = app.offers.state();
    let plan = app.commission.state().categorized();
    log::info!(
        "{} offers, commission sheets: {} individual, {} professional, {} business",
        offers.offers.len(),
        plan.individual.len(),
        plan.professional.len(),
        plan.business.len()
    );
    for error in [&offers.status.error, &app.commission.state().status.error]
        .into_iter()
        .flatten()
    {
        log::warn!("{error}");
    }
    Ok(())
}
