use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionService;
use crate::configuration::{AuthSettings, Platform};
use crate::logger::LoggerMiddleware;
use crate::metrics::{CountVisits, VisitCounter};
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login,
    metrics, refresh, reset, revoke, update_user,
};
use crate::store::{ChirpStore, RefreshTokenStore, UserStore};

/// Storage backends the server runs against
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub chirps: Arc<dyn ChirpStore>,
}

pub fn run(
    listener: TcpListener,
    stores: Stores,
    auth: AuthSettings,
    platform: Platform,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(SessionService::new(
        stores.users.clone(),
        stores.refresh_tokens.clone(),
        auth.clone(),
    ));
    let users: web::Data<dyn UserStore> = web::Data::from(stores.users);
    let refresh_tokens: web::Data<dyn RefreshTokenStore> = web::Data::from(stores.refresh_tokens);
    let chirps: web::Data<dyn ChirpStore> = web::Data::from(stores.chirps);
    let platform = web::Data::new(platform);
    let visits = web::Data::new(VisitCounter::new());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(sessions.clone())
            .app_data(users.clone())
            .app_data(refresh_tokens.clone())
            .app_data(chirps.clone())
            .app_data(platform.clone())
            .app_data(visits.clone())

            .route("/api/healthz", web::get().to(health_check))

            // Session lifecycle
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            // Credential updates require an access token; registration does not
            .service(
                web::resource("/api/users")
                    .guard(guard::Put())
                    .route(web::put().to(update_user))
                    .wrap(JwtMiddleware::new(auth.clone())),
            )
            .route("/api/users", web::post().to(create_user))

            // Chirps: public reads, authenticated writes
            .service(
                web::resource("/api/chirps")
                    .guard(guard::Post())
                    .route(web::post().to(create_chirp))
                    .wrap(JwtMiddleware::new(auth.clone())),
            )
            .route("/api/chirps", web::get().to(list_chirps))
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .guard(guard::Delete())
                    .route(web::delete().to(delete_chirp))
                    .wrap(JwtMiddleware::new(auth.clone())),
            )
            .route("/api/chirps/{chirp_id}", web::get().to(get_chirp))

            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            // Static files, counted by the visit counter
            .service(
                web::scope("/app")
                    .wrap(CountVisits::new(visits.clone()))
                    .service(fs::Files::new("/", "./public").index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
