use std::collections::BTreeMap;

use metric_sampler::{
    backend::http::SECRET_HEADER,
    util::{get_addr, get_port, get_secret},
};
use rocket::{
    figment::Figment,
    get,
    http::Status,
    launch,
    request::{FromRequest, Outcome},
    routes,
    serde::json::Json,
};
use sysinfo::{Components, System};
use tracing::{instrument, level_filters::LevelFilter};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Read every channel this host can serve, keyed by channel name
///
/// Names follow a dotted vocabulary (`cpu.*`, `mem.*`, `load.*`,
/// `system.*`, `temp.*`) so samplers can select groups with a single glob.
fn collect_channels() -> BTreeMap<String, f64> {
    let mut sys = System::new_all();
    sys.refresh_all();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_all();

    let mut channels = BTreeMap::new();

    let cpus = sys.cpus();
    if !cpus.is_empty() {
        let usage_sum = cpus.iter().map(|cpu| cpu.cpu_usage()).sum::<f32>();
        channels.insert(
            "cpu.average_usage".to_string(),
            f64::from(usage_sum) / cpus.len() as f64,
        );
    }
    for (i, cpu) in cpus.iter().enumerate() {
        channels.insert(format!("cpu.{i}.usage"), f64::from(cpu.cpu_usage()));
        channels.insert(format!("cpu.{i}.frequency"), cpu.frequency() as f64);
    }

    channels.insert("mem.total".to_string(), sys.total_memory() as f64);
    channels.insert("mem.used".to_string(), sys.used_memory() as f64);
    channels.insert("mem.swap.total".to_string(), sys.total_swap() as f64);
    channels.insert("mem.swap.used".to_string(), sys.used_swap() as f64);

    let load = System::load_average();
    channels.insert("load.one".to_string(), load.one);
    channels.insert("load.five".to_string(), load.five);
    channels.insert("load.fifteen".to_string(), load.fifteen);

    channels.insert("system.uptime".to_string(), System::uptime() as f64);

    let components = Components::new_with_refreshed_list();
    let temperatures: Vec<f32> = components
        .iter()
        .filter_map(|component| component.temperature())
        .collect();
    if !temperatures.is_empty() {
        channels.insert(
            "temp.average".to_string(),
            f64::from(temperatures.iter().sum::<f32>()) / temperatures.len() as f64,
        );
    }
    for component in components.iter() {
        if let Some(temperature) = component.temperature() {
            channels.insert(
                format!("temp.{}", channel_label(component.label())),
                f64::from(temperature),
            );
        }
    }

    channels
}

/// Lowercase a component label and squash anything outside `[a-z0-9]` to `_`
fn channel_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[get("/metrics")]
#[instrument]
fn metrics(_secret: SecretKey) -> Json<Vec<String>> {
    Json(collect_channels().into_keys().collect())
}

#[get("/metrics/<name>")]
#[instrument]
fn metric(name: &str, _secret: SecretKey) -> Option<Json<f64>> {
    collect_channels().get(name).copied().map(Json)
}

#[get("/ping")]
fn ping() {}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new()
        .with_target("sampler_agent", LevelFilter::TRACE)
        .with_default(LevelFilter::INFO);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(true),
        )
        .with(filter)
        .init();
}

fn get_config() -> Figment {
    rocket::Config::figment()
        .merge(("port", get_port()))
        .merge(("address", get_addr()))
        .merge(("workers", 1))
}

#[launch]
fn rocket() -> _ {
    init();
    let figment = get_config();

    rocket::custom(figment).mount("/", routes![metrics, metric, ping])
}

#[derive(Debug)]
struct SecretKey;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SecretKey {
    type Error = ();

    async fn from_request(
        request: &'r rocket::Request<'_>,
    ) -> rocket::request::Outcome<Self, Self::Error> {
        let header = request.headers().get_one(SECRET_HEADER);
        let secret = get_secret();
        if let Some(secret) = secret {
            if let Some(passed_secret) = header
                && passed_secret == secret
            {
                Outcome::Success(SecretKey)
            } else {
                Outcome::Error((Status::Unauthorized, ()))
            }
        } else {
            Outcome::Success(SecretKey)
        }
    }
}
