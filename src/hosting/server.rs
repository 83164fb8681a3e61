use super::*;
use crate::config::Config;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use serde::Deserialize;
use std::sync::Arc;

/// Query string of a WebSocket join request.
#[derive(Debug, Deserialize)]
pub struct JoinQuery {
    pub lobby: String,
    pub user: String,
}

/// Body of a lobby validation request.
#[derive(Debug, Deserialize)]
pub struct ValidRequest {
    pub name: String,
    pub lobby: String,
}

pub struct Server;

impl Server {
    pub async fn run(config: Config) -> Result<(), std::io::Error> {
        let state = web::Data::from(Arc::new(Casino::new(config.idle())));
        log::info!("starting lobby server on {}", config.bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .configure(routes)
        })
        .workers(config.workers)
        .bind(config.bind.as_str())?
        .run()
        .await
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/newLobby", web::post().to(new_lobby))
        .route("/valid", web::post().to(valid))
        .route("/joinLobby", web::get().to(join_lobby));
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

async fn new_lobby(casino: web::Data<Casino>) -> impl Responder {
    let name = casino.fresh_name().await;
    HttpResponse::Ok().json(serde_json::json!({ "name": name }))
}

async fn valid(casino: web::Data<Casino>, body: web::Json<ValidRequest>) -> impl Responder {
    match casino.exists(&body.lobby).await {
        true => HttpResponse::Ok().finish(),
        false => {
            log::debug!("[casino] {} asked for missing lobby {}", body.name, body.lobby);
            HttpResponse::BadRequest().finish()
        }
    }
}

async fn join_lobby(
    casino: web::Data<Casino>,
    query: web::Query<JoinQuery>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    let JoinQuery { lobby, user } = query.into_inner();
    if lobby.is_empty() || user.is_empty() {
        return HttpResponse::BadRequest()
            .body("lobby and user are required")
            .map_into_right_body();
    }
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            let casino = casino.into_inner();
            match casino.bridge(&lobby, &user, session, stream).await {
                Ok(()) => response.map_into_left_body(),
                Err(e) => HttpResponse::ServiceUnavailable()
                    .body(e.to_string())
                    .map_into_right_body(),
            }
        }
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn state() -> web::Data<Casino> {
        web::Data::from(Arc::new(Casino::default()))
    }

    #[actix_web::test]
    async fn health_is_ok() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn new_lobby_returns_code() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::post().uri("/newLobby").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"].as_str().map(str::len), Some(4));
    }

    #[actix_web::test]
    async fn valid_checks_existence() {
        let casino = state();
        casino.clone().into_inner().get_or_create("abcd").await;
        let app = test::init_service(App::new().app_data(casino).configure(routes)).await;
        let req = test::TestRequest::post()
            .uri("/valid")
            .set_json(serde_json::json!({"name": "alice", "lobby": "abcd"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::post()
            .uri("/valid")
            .set_json(serde_json::json!({"name": "alice", "lobby": "zzzz"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }
}
