use actix_csp_demo::demo::{self, DemoPolicies, ServerSettings};
use actix_web::{middleware::Logger, App, HttpServer};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = ServerSettings::from_env();
    let policies = settings
        .load_custom_policy()
        .and_then(DemoPolicies::build)
        .map_err(|e| {
            log::error!("invalid CSP policy: {}", e);
            io::Error::new(io::ErrorKind::InvalidInput, e)
        })?;

    log::info!("CSP demo available at http://{}", settings.addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(demo::configure(policies.clone()))
    })
    .bind(&settings.addr)?
    .run()
    .await
}
