//! Rocket routes of the fixture server

use std::path::PathBuf;
use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::http::Status;
use rocket::{Build, Rocket, State, get, post, routes};
use tracing::{error, info};

use crate::constants::{BIND_ADDRESS, SHUTDOWN_GRACE_SECS};
use crate::greeting::SharedGreetingClient;
use crate::project::{BuildState, DevModeProject};

/// Greeting client behind the fault-tolerant route
#[derive(Clone)]
pub struct GreetingState {
    /// Client answering the route
    pub client: SharedGreetingClient,
}

impl GreetingState {
    /// State wrapping `client`
    pub fn new(client: SharedGreetingClient) -> Self {
        Self { client }
    }
}

/// Project served in dev mode
#[derive(Clone)]
pub struct FixtureState {
    /// Project with live reload
    pub project: Arc<DevModeProject>,
}

/// Rocket configuration for a local fixture server on `port`
pub fn rocket_config(port: u16) -> Figment {
    rocket::Config::figment()
        .merge(("address", BIND_ADDRESS))
        .merge(("port", port))
        .merge(("log_level", "off"))
        .merge(("cli_colors", false))
        .merge(("shutdown.grace", SHUTDOWN_GRACE_SECS))
        .merge(("shutdown.mercy", SHUTDOWN_GRACE_SECS))
}

/// Rocket serving only the greeting route
pub fn greeting_rocket(greeting: GreetingState) -> Rocket<Build> {
    rocket::build()
        .manage(greeting)
        .mount("/", routes![call_with_fault_tolerance])
}

/// Rocket serving the project and the greeting route
pub fn fixture_rocket(project: Arc<DevModeProject>, greeting: GreetingState) -> Rocket<Build> {
    greeting_rocket(greeting)
        .manage(FixtureState { project })
        .mount("/", routes![readiness, serve_route])
        .attach(AdHoc::on_liftoff("Listening banner", |rocket| {
            Box::pin(async move {
                let config = rocket.config();
                info!("Listening on http://{}:{}", config.address, config.port);
            })
        }))
}

#[get("/")]
fn readiness(state: &State<FixtureState>) -> (Status, String) {
    let project = &state.project;
    match project.current().as_ref() {
        BuildState::Compiled(compiled) => {
            let info = &project.manifest().project;
            (
                Status::Ok,
                format!(
                    "ready\nproject: {}\ngroup: {}\nversion: {}\nmodule: {}\nmodules: {}\n",
                    info.name,
                    info.group,
                    info.version,
                    compiled.module,
                    compiled.modules.join(", ")
                ),
            )
        }
        BuildState::Failed(e) => (Status::InternalServerError, e.to_string()),
    }
}

#[get("/<path..>", rank = 2)]
fn serve_route(path: PathBuf, state: &State<FixtureState>) -> (Status, String) {
    let route = format!("/{}", path.to_string_lossy().replace('\\', "/"));
    match state.project.current().as_ref() {
        BuildState::Compiled(compiled) => match compiled.routes.get(&route) {
            Some(content) => (Status::Ok, content.clone()),
            None => (Status::NotFound, format!("No route for {route}")),
        },
        BuildState::Failed(e) => (Status::InternalServerError, e.to_string()),
    }
}

#[post("/call-with-fault-tolerance-on-interface")]
async fn call_with_fault_tolerance(state: &State<GreetingState>) -> (Status, String) {
    match state.client.hello().await {
        Ok(greeting) => (Status::Ok, greeting),
        Err(e) => {
            error!(error = %e, "Greeting call failed");
            (Status::InternalServerError, e.to_string())
        }
    }
}
