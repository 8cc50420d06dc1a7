use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use portal_backend::{
    config::Config,
    database::create_store,
    external::Notifier,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{context}: {e}");
    std::io::Error::other(format!("{context}: {e}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config =
        Config::from_toml().map_err(|e| startup_error("Failed to load configuration", e))?;

    // 文档存储（memory:// 或 Postgres，后者会先执行迁移）
    let store = create_store(&config.database)
        .await
        .map_err(|e| startup_error("Failed to initialise store", e))?;

    let jwt_service = JwtService::new(&config.jwt.secret);
    let notifier = Notifier::from_config(&config.smtp)
        .map_err(|e| startup_error("Failed to initialise mail transport", e))?;

    // 创建服务
    let raffle_service = RaffleService::new(store.clone(), notifier.clone(), &config.raffle);
    let event_service = EventService::new(store.clone(), notifier);
    let employee_service = EmployeeService::new(store.clone());
    let module_config_service = ModuleConfigService::new(store);

    // 启动后台任务
    tasks::spawn_all(raffle_service.clone(), config.raffle.sweep_interval_secs);

    log::info!(
        "Starting HTTP server at {}:{} (claim window {}s)",
        config.server.host,
        config.server.port,
        config.raffle.claim_window_secs
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(raffle_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(employee_service.clone()))
            .app_data(web::Data::new(module_config_service.clone()))
            .configure(swagger_config)
            .route("/health", web::get().to(handlers::health))
            .service(web::scope("/api/v1").configure(handlers::api_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
