use std::error::Error;
use std::process::ExitCode;

use api::backend::Backend;
use api::client::HttpBackend;
use clap::Parser;
use model::bbox::BoundingBox;
use serde::Serialize;
use store::app_store::AppStore;
use store::state::Mode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use viewer::actions;
use viewer::config::{Cli, Command, ViewerConfig};
use viewer::forms::{ClusteringForm, SpeedProfileForm};
use viewer::panel::{TrafficStopRow, traffic_stop_rows};
use viewer::{MapController, MapSummary, ViewSync, Viewport};

struct Session {
    store: AppStore,
    map: MapController,
    sync: ViewSync,
}

impl Session {
    fn new(config: &ViewerConfig) -> Self {
        Self {
            store: AppStore::new(),
            map: MapController::new(Viewport::new(config.width_px, config.height_px)),
            sync: ViewSync::new(),
        }
    }

    fn dispatch(&mut self) {
        self.sync.dispatch(&mut self.store, &mut self.map);
    }

    /// Sets the working area and zooms the view onto it.
    fn set_working_area(&mut self, bbox: BoundingBox) {
        self.store.set_bbox(bbox);
        self.map.viewport_mut().fit(bbox.extent(), 0.0, viewer::viewport::MAX_ZOOM);
    }
}

#[derive(Serialize)]
struct RouteTraffic {
    route: String,
    stops: Vec<TrafficStopRow>,
}

#[derive(Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    map: MapSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    traffic: Vec<RouteTraffic>,
}

impl Report {
    fn of(session: &Session) -> Self {
        Self {
            status: session
                .store
                .fetch_info()
                .map(|i| format!("{}: {}", i.status, i.message)),
            map: session.map.summary(),
            traffic: Vec::new(),
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = ViewerConfig::from_env()?.with_cli(&cli);
    info!("using backend at {}", config.api_base_url);
    let http = HttpBackend::new(&config.api_base_url)?;
    let backend: &dyn Backend = &http;
    let mut session = Session::new(&config);

    match cli.command {
        Command::BusData {
            bbox,
            source,
            display,
        } => {
            session.set_working_area(bbox);
            session.store.set_source(source);
            session.store.set_display_info(display);
            actions::fetch_bus_data(&mut session.store, backend).await?;
            session.dispatch();
            print_json(&Report::of(&session))
        }
        Command::Traffic {
            bbox,
            profile,
            weekday,
            hour,
        } => {
            session.set_working_area(bbox);
            actions::switch_mode(&mut session.store, backend, Mode::TrafficFlow).await?;
            let mut form = SpeedProfileForm::new();
            form.refresh(&mut session.store, backend).await?;
            form.open(&profile, &mut session.store, backend).await?;
            form.set_time(weekday, hour, &mut session.store);
            session.dispatch();

            let mut report = Report::of(&session);
            let traffic = session.store.traffic_flow();
            report.traffic = traffic
                .routes
                .iter()
                .map(|route| RouteTraffic {
                    route: route.name.clone(),
                    stops: traffic_stop_rows(route, traffic.flow.get(&route.id).map(Vec::as_slice)),
                })
                .collect();
            print_json(&report)
        }
        Command::Clustering { bbox, profile } => {
            session.set_working_area(bbox);
            actions::switch_mode(&mut session.store, backend, Mode::StopsClustering).await?;
            let mut form = ClusteringForm::new();
            form.refresh(&mut session.store, backend).await?;
            form.open(&profile, &mut session.store, backend).await?;
            form.apply(&mut session.store, backend).await?;
            session.dispatch();
            print_json(&Report::of(&session))
        }
        Command::Profiles => {
            let mut speed = SpeedProfileForm::new();
            let mut clustering = ClusteringForm::new();
            speed.refresh(&mut session.store, backend).await?;
            clustering.refresh(&mut session.store, backend).await?;
            print_json(&serde_json::json!({
                "speed_profiles": speed.profiles,
                "clustering_profiles": clustering.profiles,
            }))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
