use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::auth::AuthService;
use wordboard_core::{EngineError, GameEngine, LeaderboardService};
use wordboard_types::{
    GuessResult, Leaderboard, LeaderboardError, LeaderboardResult, LeaderboardStat, RepoError,
    User, UserStore,
};

pub mod auth;
pub mod config;

#[derive(Deserialize)]
struct GuessRequest {
    guess: String,
}

#[derive(Deserialize)]
struct CreateUserRequest {
    token: String,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct CreateLeaderboardRequest {
    name: String,
}

#[derive(Serialize)]
struct LeaderboardView {
    leaderboard: Leaderboard,
    members: Vec<User>,
    stats: Vec<LeaderboardStat>,
}

type ApiReply = WithStatus<Json>;

pub fn create_routes(
    engine: Arc<GameEngine>,
    leaderboards: Arc<LeaderboardService>,
    users: Arc<dyn UserStore>,
    auth_service: Arc<AuthService>,
    request_timeout: Duration,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let engine_filter = warp::any().map({
        let engine = engine.clone();
        move || engine.clone()
    });

    let leaderboards_filter = warp::any().map({
        let leaderboards = leaderboards.clone();
        move || leaderboards.clone()
    });

    let users_filter = warp::any().map({
        let users = users.clone();
        move || users.clone()
    });

    let auth_filter = warp::any().map({
        let auth_service = auth_service.clone();
        move || auth_service.clone()
    });

    let timeout_filter = warp::any().map(move || request_timeout);

    let auth_header = warp::header::optional::<String>("authorization");

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Today's board, created lazily on first access
    let today_board = warp::path!("board" / "today")
        .and(warp::get())
        .and(auth_header.clone())
        .and(engine_filter.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_today_board);

    // Historical board by day index; never creates
    let board_by_day = warp::path!("board" / i32)
        .and(warp::get())
        .and(auth_header.clone())
        .and(engine_filter.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_board_by_day);

    let guess = warp::path!("board" / "guess")
        .and(warp::post())
        .and(warp::body::json::<GuessRequest>())
        .and(auth_header.clone())
        .and(engine_filter.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_guess);

    let me = warp::path!("me")
        .and(warp::get())
        .and(auth_header.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_me);

    let create_user = warp::path!("api" / "users")
        .and(warp::post())
        .and(warp::body::json::<CreateUserRequest>())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_create_user);

    let create_leaderboard = warp::path!("leaderboards")
        .and(warp::post())
        .and(warp::body::json::<CreateLeaderboardRequest>())
        .and(auth_header.clone())
        .and(leaderboards_filter.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_create_leaderboard);

    let join_leaderboard = warp::path!("leaderboards" / String / "join")
        .and(warp::post())
        .and(auth_header.clone())
        .and(leaderboards_filter.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_join_leaderboard);

    let get_leaderboard = warp::path!("leaderboards" / String)
        .and(warp::get())
        .and(auth_header.clone())
        .and(leaderboards_filter.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_get_leaderboard);

    let my_leaderboards = warp::path!("me" / "leaderboards")
        .and(warp::get())
        .and(auth_header.clone())
        .and(leaderboards_filter.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_my_leaderboards);

    let my_boards = warp::path!("me" / "boards")
        .and(warp::get())
        .and(auth_header.clone())
        .and(engine_filter.clone())
        .and(auth_filter.clone())
        .and(users_filter.clone())
        .and(timeout_filter.clone())
        .and_then(handle_my_boards);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(today_board)
        .or(board_by_day)
        .or(guess)
        .or(my_leaderboards)
        .or(my_boards)
        .or(me)
        .or(create_user)
        .or(create_leaderboard)
        .or(join_leaderboard)
        .or(get_leaderboard)
        .with(cors)
        .with(warp::log("wordboard"))
}

/// Race the future against the request deadline; expiry drops the store
/// call and surfaces as a cancellation, never a fallback write.
async fn within<T, E>(timeout: Duration, fut: impl Future<Output = Result<T, E>>) -> Result<T, E>
where
    E: From<RepoError>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(E::from(RepoError::Cancelled)),
    }
}

fn reply_ok<T: Serialize>(value: &T) -> ApiReply {
    warp::reply::with_status(warp::reply::json(value), StatusCode::OK)
}

fn error_reply(status: StatusCode, message: &str) -> ApiReply {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message })),
        status,
    )
}

fn repo_error_reply(err: &RepoError) -> ApiReply {
    match err {
        RepoError::NotFound => error_reply(StatusCode::NOT_FOUND, "Not found"),
        RepoError::Conflict => error_reply(StatusCode::CONFLICT, "Conflicting write, retry"),
        RepoError::Cancelled => error_reply(StatusCode::GATEWAY_TIMEOUT, "Request timed out"),
        RepoError::Failure(_) => {
            tracing::error!("repository failure: {err}");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

fn engine_error_reply(err: &EngineError) -> ApiReply {
    match err {
        EngineError::Repo(repo) => repo_error_reply(repo),
        EngineError::NoPuzzleForDay(day) => {
            tracing::error!("no puzzle scheduled for day {day}");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

fn leaderboard_result_reply(result: &LeaderboardResult, success_status: StatusCode) -> ApiReply {
    match result {
        LeaderboardResult::Leaderboard(board) => {
            warp::reply::with_status(warp::reply::json(board), success_status)
        }
        LeaderboardResult::Error { error } => {
            let status = match error {
                LeaderboardError::DoesNotExist => StatusCode::NOT_FOUND,
                LeaderboardError::NotAuthorized => StatusCode::FORBIDDEN,
                LeaderboardError::CouldNotCreate => StatusCode::CONFLICT,
            };
            warp::reply::with_status(
                warp::reply::json(&serde_json::json!({ "error": error })),
                status,
            )
        }
    }
}

/// Resolve the bearer token to a stored user, or produce the error reply
/// the handler should return as-is.
async fn authenticate(
    auth_header: Option<String>,
    auth_service: &AuthService,
    users: &dyn UserStore,
    timeout: Duration,
) -> Result<User, ApiReply> {
    let Some(header) = auth_header else {
        return Err(error_reply(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
        ));
    };
    let token = header.strip_prefix("Bearer ").unwrap_or(&header);

    let subject = match auth_service.validate_token(token).await {
        Ok(subject) => subject,
        Err(_) => {
            return Err(error_reply(
                StatusCode::UNAUTHORIZED,
                "Invalid authentication token",
            ));
        }
    };

    match within(timeout, users.find_by_oauth_id(&subject.oauth_id)).await {
        Ok(user) => Ok(user),
        Err(RepoError::NotFound) => Err(error_reply(
            StatusCode::UNAUTHORIZED,
            "Unknown user, register first",
        )),
        Err(err) => Err(repo_error_reply(&err)),
    }
}

async fn handle_today_board(
    auth_header: Option<String>,
    engine: Arc<GameEngine>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match within(timeout, engine.today_board_or_create(user.id, Utc::now())).await {
        Ok(board) => Ok(reply_ok(&board)),
        Err(err) => Ok(repo_error_reply(&err)),
    }
}

async fn handle_board_by_day(
    day: i32,
    auth_header: Option<String>,
    engine: Arc<GameEngine>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match within(timeout, engine.board_by_day(user.id, day)).await {
        Ok(board) => Ok(reply_ok(&board)),
        Err(err) => Ok(repo_error_reply(&err)),
    }
}

async fn handle_guess(
    request: GuessRequest,
    auth_header: Option<String>,
    engine: Arc<GameEngine>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match within(timeout, engine.guess(user.id, &request.guess, Utc::now())).await {
        Ok(GuessResult::Board(board)) => Ok(reply_ok(&board)),
        Ok(GuessResult::Invalid { error }) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "error": error })),
            StatusCode::UNPROCESSABLE_ENTITY,
        )),
        Err(err) => Ok(engine_error_reply(&err)),
    }
}

async fn handle_me(
    auth_header: Option<String>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => Ok(reply_ok(&user)),
        Err(reply) => Ok(reply),
    }
}

async fn handle_create_user(
    request: CreateUserRequest,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let subject = match auth_service.validate_token(&request.token).await {
        Ok(subject) => subject,
        Err(_) => {
            return Ok(error_reply(
                StatusCode::UNAUTHORIZED,
                "Invalid authentication token",
            ));
        }
    };

    // registration is idempotent per oauth subject
    match within(timeout, users.find_by_oauth_id(&subject.oauth_id)).await {
        Ok(existing) => return Ok(reply_ok(&existing)),
        Err(RepoError::NotFound) => {}
        Err(err) => return Ok(repo_error_reply(&err)),
    }

    let user = User {
        id: Uuid::new_v4(),
        display_name: request.display_name.unwrap_or(subject.display_name),
        oauth_id: subject.oauth_id.clone(),
    };

    match within(timeout, users.create(&user)).await {
        Ok(created) => Ok(warp::reply::with_status(
            warp::reply::json(&created),
            StatusCode::CREATED,
        )),
        Err(RepoError::Conflict) => {
            // concurrent first login for the same subject; the stored row wins
            match within(timeout, users.find_by_oauth_id(&subject.oauth_id)).await {
                Ok(existing) => Ok(reply_ok(&existing)),
                Err(err) => Ok(repo_error_reply(&err)),
            }
        }
        Err(err) => Ok(repo_error_reply(&err)),
    }
}

async fn handle_create_leaderboard(
    request: CreateLeaderboardRequest,
    auth_header: Option<String>,
    leaderboards: Arc<LeaderboardService>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match within(
        timeout,
        leaderboards.create_leaderboard(user.id, &request.name),
    )
    .await
    {
        Ok(result) => Ok(leaderboard_result_reply(&result, StatusCode::CREATED)),
        Err(err) => Ok(repo_error_reply(&err)),
    }
}

async fn handle_join_leaderboard(
    join_id: String,
    auth_header: Option<String>,
    leaderboards: Arc<LeaderboardService>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match within(timeout, leaderboards.join_leaderboard(user.id, &join_id)).await {
        Ok(result) => Ok(leaderboard_result_reply(&result, StatusCode::OK)),
        Err(err) => Ok(repo_error_reply(&err)),
    }
}

async fn handle_get_leaderboard(
    join_id: String,
    auth_header: Option<String>,
    leaderboards: Arc<LeaderboardService>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    let board = match within(timeout, leaderboards.get_leaderboard(user.id, &join_id)).await {
        Ok(LeaderboardResult::Leaderboard(board)) => board,
        Ok(result) => return Ok(leaderboard_result_reply(&result, StatusCode::OK)),
        Err(err) => return Ok(repo_error_reply(&err)),
    };

    let members = match within(timeout, leaderboards.members(&board)).await {
        Ok(members) => members,
        Err(err) => return Ok(repo_error_reply(&err)),
    };
    let stats = match within(
        timeout,
        leaderboards.stats_for_leaderboard(&board, user.id, Utc::now()),
    )
    .await
    {
        Ok(stats) => stats,
        Err(err) => return Ok(engine_error_reply(&err)),
    };

    Ok(reply_ok(&LeaderboardView {
        leaderboard: board,
        members,
        stats,
    }))
}

async fn handle_my_boards(
    auth_header: Option<String>,
    engine: Arc<GameEngine>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match within(timeout, engine.boards_for_user(user.id)).await {
        Ok(boards) => Ok(reply_ok(&boards)),
        Err(err) => Ok(repo_error_reply(&err)),
    }
}

async fn handle_my_leaderboards(
    auth_header: Option<String>,
    leaderboards: Arc<LeaderboardService>,
    auth_service: Arc<AuthService>,
    users: Arc<dyn UserStore>,
    timeout: Duration,
) -> Result<ApiReply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service, users.as_ref(), timeout).await {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match within(timeout, leaderboards.leaderboards_for_user(user.id)).await {
        Ok(boards) => Ok(reply_ok(&boards)),
        Err(err) => Ok(repo_error_reply(&err)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use wordboard_core::{Dictionary, PuzzleCalendar};
    use wordboard_persistence::connection::connect_to_memory_database;
    use wordboard_persistence::repositories::{
        GameBoardRepository, LeaderboardRepository, UserRepository,
    };
    use wordboard_types::{GameBoard, GameState};

    const SOLUTION_CYCLE: [&str; 4] = ["crate", "alloy", "stone", "bread"];

    fn test_dictionary() -> Arc<Dictionary> {
        let guesses = "crate\ntrace\nreact\ncater\nalloy\nlolly\nstone\nbread\ncream";
        // enough scheduled days to cover "today" for any realistic clock
        let solutions: Vec<&str> = SOLUTION_CYCLE.iter().cycle().take(5000).copied().collect();
        Arc::new(Dictionary::from_word_lists(guesses, &solutions.join("\n")).unwrap())
    }

    fn todays_solution() -> &'static str {
        let day = PuzzleCalendar::day_index(Utc::now());
        SOLUTION_CYCLE[day as usize % SOLUTION_CYCLE.len()]
    }

    async fn create_test_app()
    -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let boards = Arc::new(GameBoardRepository::new(db.clone()));
        let engine = Arc::new(GameEngine::new(test_dictionary(), boards));
        let leaderboards = Arc::new(LeaderboardService::new(
            Arc::new(LeaderboardRepository::new(db.clone())),
            engine.clone(),
        ));
        let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db));
        let auth_service = Arc::new(AuthService::new_dev_mode());

        create_routes(
            engine,
            leaderboards,
            users,
            auth_service,
            Duration::from_secs(5),
        )
    }

    async fn register<F>(app: &F, token: &str) -> User
    where
        F: Filter<Error = warp::Rejection> + Clone + 'static,
        F::Extract: warp::Reply + Send,
    {
        let response = warp::test::request()
            .method("POST")
            .path("/api/users")
            .json(&serde_json::json!({ "token": token }))
            .reply(app)
            .await;
        assert_eq!(response.status(), 201, "registration should succeed");
        serde_json::from_slice(response.body()).expect("registration returns the user")
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "OK");
    }

    #[tokio::test]
    async fn test_today_board_requires_authentication() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/board/today")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 401);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let app = create_test_app().await;

        let response = warp::test::request()
            .method("GET")
            .path("/board/today")
            .header("authorization", "Bearer not-a-dev-token")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 401);
    }

    #[tokio::test]
    async fn test_registration_is_idempotent() {
        let app = create_test_app().await;

        let first = register(&app, "alice:alice@example.com:Alice").await;
        assert_eq!(first.display_name, "Alice");
        assert_eq!(first.oauth_id, "alice");

        // a second registration returns the stored user unchanged
        let response = warp::test::request()
            .method("POST")
            .path("/api/users")
            .json(&serde_json::json!({ "token": "alice:alice@example.com:Alice" }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let second: User = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_today_board_is_created_on_first_fetch() {
        let app = create_test_app().await;
        register(&app, "alice:alice@example.com:Alice").await;

        let response = warp::test::request()
            .method("GET")
            .path("/board/today")
            .header("authorization", "alice:alice@example.com:Alice")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let board: GameBoard = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(board.state, GameState::InProgress);
        assert!(board.guesses.is_empty());
        assert_eq!(board.day, PuzzleCalendar::day_index(Utc::now()));
    }

    #[tokio::test]
    async fn test_guessing_todays_solution_wins() {
        let app = create_test_app().await;
        register(&app, "alice:alice@example.com:Alice").await;

        let response = warp::test::request()
            .method("POST")
            .path("/board/guess")
            .header("authorization", "alice:alice@example.com:Alice")
            .json(&serde_json::json!({ "guess": todays_solution() }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 200);
        let board: GameBoard = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(board.state, GameState::Won);
        assert_eq!(board.guesses.len(), 1);

        // the finished board is fetchable by its day index
        let day = PuzzleCalendar::day_index(Utc::now());
        let response = warp::test::request()
            .method("GET")
            .path(&format!("/board/{day}"))
            .header("authorization", "alice:alice@example.com:Alice")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let fetched: GameBoard = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(fetched.state, GameState::Won);
    }

    #[tokio::test]
    async fn test_wrong_length_guess_is_unprocessable() {
        let app = create_test_app().await;
        register(&app, "alice:alice@example.com:Alice").await;

        let response = warp::test::request()
            .method("POST")
            .path("/board/guess")
            .header("authorization", "alice:alice@example.com:Alice")
            .json(&serde_json::json!({ "guess": "card" }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 422);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "WRONG_LENGTH");
    }

    #[tokio::test]
    async fn test_unknown_word_guess_is_unprocessable() {
        let app = create_test_app().await;
        register(&app, "alice:alice@example.com:Alice").await;

        let response = warp::test::request()
            .method("POST")
            .path("/board/guess")
            .header("authorization", "alice:alice@example.com:Alice")
            .json(&serde_json::json!({ "guess": "zzzzz" }))
            .reply(&app)
            .await;

        assert_eq!(response.status(), 422);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "NOT_A_WORD");
    }

    #[tokio::test]
    async fn test_unplayed_day_is_not_found() {
        let app = create_test_app().await;
        register(&app, "alice:alice@example.com:Alice").await;

        let response = warp::test::request()
            .method("GET")
            .path("/board/3")
            .header("authorization", "alice:alice@example.com:Alice")
            .reply(&app)
            .await;

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_board_history_listing() {
        let app = create_test_app().await;
        register(&app, "alice:alice@example.com:Alice").await;

        // playing today puts one board in the history
        warp::test::request()
            .method("GET")
            .path("/board/today")
            .header("authorization", "alice:alice@example.com:Alice")
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("GET")
            .path("/me/boards")
            .header("authorization", "alice:alice@example.com:Alice")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let boards: Vec<GameBoard> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].state, GameState::InProgress);
    }

    #[tokio::test]
    async fn test_leaderboard_lifecycle() {
        let app = create_test_app().await;
        let alice = register(&app, "alice:alice@example.com:Alice").await;
        let bob = register(&app, "bob:bob@example.com:Bob").await;
        register(&app, "carol:carol@example.com:Carol").await;

        // alice creates a board
        let response = warp::test::request()
            .method("POST")
            .path("/leaderboards")
            .header("authorization", "alice:alice@example.com:Alice")
            .json(&serde_json::json!({ "name": "the crew" }))
            .reply(&app)
            .await;
        assert_eq!(response.status(), 201);
        let created: Leaderboard = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(created.owner_id, alice.id);
        assert_eq!(created.member_ids, vec![alice.id]);

        // bob joins with the shared code
        let response = warp::test::request()
            .method("POST")
            .path(&format!("/leaderboards/{}/join", created.join_id))
            .header("authorization", "bob:bob@example.com:Bob")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let joined: Leaderboard = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(joined.member_ids, vec![alice.id, bob.id]);

        // bob can read the board, and the view carries members and stats
        let response = warp::test::request()
            .method("GET")
            .path(&format!("/leaderboards/{}", created.join_id))
            .header("authorization", "bob:bob@example.com:Bob")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let view: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view["members"].as_array().unwrap().len(), 2);
        assert!(view["stats"].is_array());

        // carol is neither owner nor member
        let response = warp::test::request()
            .method("GET")
            .path(&format!("/leaderboards/{}", created.join_id))
            .header("authorization", "carol:carol@example.com:Carol")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 403);

        // unknown join codes are not found
        let response = warp::test::request()
            .method("GET")
            .path("/leaderboards/nosuchcode")
            .header("authorization", "bob:bob@example.com:Bob")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 404);

        // bob's membership listing includes the board
        let response = warp::test::request()
            .method("GET")
            .path("/me/leaderboards")
            .header("authorization", "bob:bob@example.com:Bob")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let boards: Vec<Leaderboard> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].join_id, created.join_id);
    }

    #[tokio::test]
    async fn test_leaderboard_stats_hide_the_viewers_open_day() {
        let app = create_test_app().await;
        let _alice = register(&app, "alice:alice@example.com:Alice").await;

        let response = warp::test::request()
            .method("POST")
            .path("/leaderboards")
            .header("authorization", "alice:alice@example.com:Alice")
            .json(&serde_json::json!({ "name": "solo" }))
            .reply(&app)
            .await;
        let created: Leaderboard = serde_json::from_slice(response.body()).unwrap();

        // one accepted guess leaves today's board in progress
        warp::test::request()
            .method("POST")
            .path("/board/guess")
            .header("authorization", "alice:alice@example.com:Alice")
            .json(&serde_json::json!({ "guess": "trace" }))
            .reply(&app)
            .await;

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/leaderboards/{}", created.join_id))
            .header("authorization", "alice:alice@example.com:Alice")
            .reply(&app)
            .await;
        assert_eq!(response.status(), 200);
        let view: serde_json::Value = serde_json::from_slice(response.body()).unwrap();

        let stats = view["stats"].as_array().unwrap();
        assert_eq!(stats.len(), 1);
        let today_entries = stats[0]["stats"].as_array().unwrap();
        assert!(!today_entries.is_empty());
        for entry in today_entries {
            assert_eq!(entry["visible"], false);
        }
    }
}
