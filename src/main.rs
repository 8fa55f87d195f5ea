use std::{process, sync::Arc, time::Duration};

use insider::{
    application::{
        error::AppError,
        posts::PostService,
        repos::{
            CreateIdentityParams, IdentitiesRepo, PostsRepo, PostsWriteRepo, SessionsRepo,
        },
        sessions::SessionService,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, HttpState, RouterState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Account(args) => match args.command {
            config::AccountCommand::Add(add) => run_account_add(settings, add).await,
        },
        config::Command::Session(args) => match args.command {
            config::SessionCommand::Issue(issue) => run_session_issue(settings, issue).await,
        },
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let (http_state, api_state) = build_application_state(repositories, &settings);
    serve_http(&settings, http_state, api_state).await
}

async fn run_account_add(
    settings: config::Settings,
    args: config::AccountAddArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let sessions = session_service(&repositories);

    let identity = sessions
        .register_identity(CreateIdentityParams {
            email: args.email,
            display_name: args.display_name,
            avatar_url: args.avatar_url,
        })
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    println!("identity created: {}", identity.id);
    Ok(())
}

async fn run_session_issue(
    settings: config::Settings,
    args: config::SessionIssueArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let sessions = session_service(&repositories);

    let ttl = match args.ttl_hours {
        Some(hours) => time::Duration::hours(hours as i64),
        None => time::Duration::try_from(settings.sessions.ttl)
            .map_err(|err| AppError::unexpected(format!("invalid session ttl: {err}")))?,
    };

    let issued = sessions
        .issue(args.identity, Some(ttl))
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    // The clear token is shown exactly once and never logged.
    println!("session token: {}", issued.token);
    if let Some(expires_at) = issued.record.expires_at {
        println!("expires at: {expires_at}");
    }
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn session_service(repositories: &Arc<PostgresRepositories>) -> SessionService {
    let sessions_repo: Arc<dyn SessionsRepo> = repositories.clone();
    let identities_repo: Arc<dyn IdentitiesRepo> = repositories.clone();
    SessionService::new(sessions_repo, identities_repo)
}

fn build_application_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> (HttpState, ApiState) {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let identities_repo: Arc<dyn IdentitiesRepo> = repositories.clone();

    let posts = Arc::new(PostService::new(
        posts_repo,
        posts_write_repo,
        settings.feed.recent_limit.get(),
    ));
    let sessions = Arc::new(session_service(&repositories));

    let http_state = HttpState {
        posts: posts.clone(),
        sessions: sessions.clone(),
        identities: identities_repo,
        db: repositories.clone(),
    };
    let api_state = ApiState {
        posts,
        sessions,
        db: repositories,
    };

    (http_state, api_state)
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    api_state: ApiState,
) -> Result<(), AppError> {
    let router_state = RouterState {
        http: http_state,
        api: api_state,
    };
    let public_router = http::build_router(router_state.clone());
    let api_router = http::build_api_v1_router(router_state.clone());

    let router = public_router.merge(api_router).with_state(router_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "insider::server",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }

    info!(
        target = "insider::server",
        grace_secs = grace.as_secs(),
        "shutdown signal received; draining connections"
    );

    // Hard stop if connections refuse to drain within the grace period.
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        process::exit(0);
    });
}
