//! Backend entry-point: loads settings, opens the stores and serves the API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use actix_web::cookie::SameSite;
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use cw_backend::inbound::http::health::HealthState;
use cw_backend::server::{
    BuildMode, ServerSettings, SessionSettings, Stores, build_http_state, create_server,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| io::Error::other(format!("loading settings: {err}")))?;
    let mode = BuildMode::from_debug_assertions();
    let session = SessionSettings {
        key: settings.session_key(mode).map_err(io::Error::other)?,
        cookie_secure: settings.cookie_secure(),
        same_site: SameSite::Lax,
    };
    if !session.cookie_secure {
        warn!("session cookies are not marked Secure");
    }

    let stores = Stores::open(
        settings.data_dir.as_deref(),
        settings.public_base_url().map_err(io::Error::other)?,
        settings.resilience(),
    )?;
    let http_state = build_http_state(
        &stores,
        settings.admin_credentials().map_err(io::Error::other)?,
    );
    let health_state = web::Data::new(HealthState::new(stores.records.clone()));

    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    create_server(health_state, http_state, session, bind_addr)?.await
}
