mod error;
mod v1;

use std::{
    fs, io,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use chrono::{DateTime, Utc};
use clap::Parser;
use eyre::WrapErr;
use serde::Deserialize;
use studyhub_api::v1::{
    ClassAssignment, ClassAssignmentRecord, Cohort, Collection, Event, ItemKind, ItemRecord,
    NewEvent, Timetable,
};
use tokio::sync::Mutex;
use tracing::info;

/// Serves the StudyHub screens over HTTP.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, env = "STUDYHUB_PORT", default_value_t = 7890)]
    port: u16,

    /// RON file the screens are seeded from. Read once at startup.
    #[arg(long, env = "STUDYHUB_SEED", default_value = "seed.ron")]
    seed: PathBuf,

    #[arg(long, env = "SSL_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    #[arg(long, env = "SSL_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let state = Arc::new(AppState::load(&args.seed, Utc::now())?);
    let app = app(state);

    let addr = SocketAddr::from(([0; 4], args.port));

    match (args.tls_cert, args.tls_key) {
        (Some(cert), Some(key)) => {
            let config = RustlsConfig::from_pem_file(cert, key).await?;

            info!(%addr, "listening with tls");
            axum_server::bind_rustls(addr, config)
                .serve(app.into_make_service())
                .await?;
        }
        _ => {
            info!(%addr, "listening");
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", v1::router())
        .with_state(state)
}

/// Each screen exclusively owns its collection. A handler derives its view
/// while still holding the lock it mutated under.
#[derive(Debug)]
pub struct AppState {
    pub generation: AtomicU64,
    pub tasks: Mutex<Collection>,
    pub dashboard: Mutex<Collection>,
    pub assignments: Mutex<Cohort>,
    pub timetable: Mutex<Timetable>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            generation: AtomicU64::new(0),
            tasks: Mutex::new(Collection::new(ItemKind::Task)),
            dashboard: Mutex::new(Collection::new(ItemKind::Assignment)),
            assignments: Mutex::new(Cohort::default()),
            timetable: Mutex::new(Timetable::default()),
        }
    }
}

impl AppState {
    pub fn load(path: &Path, now: DateTime<Utc>) -> eyre::Result<Self> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no seed file, starting empty");
                return Ok(Self::default());
            }
            Err(err) => eyre::bail!(err),
        };
        let seed: SeedOwned = ron::de::from_reader(file)
            .wrap_err_with(|| format!("failed to parse seed file {}", path.display()))?;

        match seed {
            SeedOwned::V1 {
                tasks,
                dashboard,
                assignments,
                events,
            } => Self::from_v1(tasks, dashboard, assignments, events, now),
        }
    }

    fn from_v1(
        tasks: Vec<ItemRecord>,
        dashboard: Vec<ItemRecord>,
        assignments: Vec<ClassAssignmentRecord>,
        events: Vec<NewEvent>,
        now: DateTime<Utc>,
    ) -> eyre::Result<Self> {
        let tasks = seed_collection(ItemKind::Task, tasks, now).wrap_err("invalid seeded task")?;
        let dashboard = seed_collection(ItemKind::Assignment, dashboard, now)
            .wrap_err("invalid seeded dashboard assignment")?;

        let assignments = (assignments.into_iter())
            .map(|record| ClassAssignment::from_record(record, now))
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("invalid seeded class assignment")?;
        let assignments = Cohort::new(assignments).wrap_err("invalid seeded class assignment")?;

        let events = (events.into_iter())
            .map(Event::new)
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("invalid seeded timetable event")?;

        info!(
            tasks = tasks.len(),
            dashboard = dashboard.len(),
            assignments = assignments.assignments().len(),
            events = events.len(),
            "seeded screens"
        );

        Ok(Self {
            generation: AtomicU64::new(0),
            tasks: Mutex::new(tasks),
            dashboard: Mutex::new(dashboard),
            assignments: Mutex::new(assignments),
            timetable: Mutex::new(Timetable::new(events)),
        })
    }

    pub fn increment_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed)
    }
}

fn seed_collection(
    kind: ItemKind,
    records: Vec<ItemRecord>,
    now: DateTime<Utc>,
) -> eyre::Result<Collection> {
    let items = (records.into_iter())
        .map(|record| record.into_item(kind, now))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Collection::with_items(kind, items)?)
}

#[derive(Deserialize)]
enum SeedOwned {
    V1 {
        #[serde(default)]
        tasks: Vec<ItemRecord>,
        #[serde(default)]
        dashboard: Vec<ItemRecord>,
        #[serde(default)]
        assignments: Vec<ClassAssignmentRecord>,
        #[serde(default)]
        events: Vec<NewEvent>,
    },
}
