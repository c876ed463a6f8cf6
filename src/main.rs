#[macro_use]
extern crate rocket;

use rocket::response::content;
use rocket::serde::json::Json;
use rocket::State;
use rocket_cors::{AllowedOrigins, CorsOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use risk_game_engine::{
    card::CardKind,
    event::GameEvent,
    game::{Game, GameSettings, GameState},
    game_config::{GameConfig, MapError},
    odds::{OddsTable, DEFAULT_TABLE_FILE},
    player::Color,
    GameError,
};

const MAP_FILE_ENV: &str = "RISK_MAP_FILE";

#[derive(Serialize, Debug)]
struct GameResponse {
    game_state: Option<GameState>,
    events: Vec<GameEvent>,
    result: Option<Value>,
    error: Option<String>,
}

impl GameResponse {
    fn unavailable() -> Self {
        GameResponse {
            game_state: None,
            events: vec![],
            result: None,
            error: Some("the game worker is not running".to_string()),
        }
    }
}

#[derive(Deserialize, Debug)]
struct AddPlayerData {
    name: String,
    color: Color,
}

#[derive(Deserialize, Debug)]
struct RemovePlayerData {
    name: String,
}

#[derive(Deserialize, Debug)]
struct ReinforceData {
    player: String,
    territory: String,
    units: u32,
}

#[derive(Deserialize, Debug)]
struct AttackData {
    player: String,
    from_territory: String,
    to_territory: String,
    attack_units: u32,
    defend_units: u32,
}

#[derive(Deserialize, Debug)]
struct MoveUnitsData {
    player: String,
    from_territory: String,
    to_territory: String,
    units: u32,
}

#[derive(Deserialize, Debug)]
struct TurnInCardsData {
    player: String,
    cards: [CardKind; 3],
}

#[derive(Deserialize, Debug)]
struct EndPhaseData {
    player: String,
}

#[derive(Deserialize, Debug, Default)]
struct NewGameData {
    config_file: Option<String>,
    seed: Option<u64>,
    starting_armies: Option<u32>,
}

#[derive(Debug)]
enum Request {
    AddPlayer(AddPlayerData),
    RemovePlayer(RemovePlayerData),
    StartGame,
    Reinforce(ReinforceData),
    Attack(AttackData),
    MoveUnits(MoveUnitsData),
    TurnInCards(TurnInCardsData),
    EndPhase(EndPhaseData),
    NewGame(NewGameData),
    GetGameState,
    GetPlayer(String),
}

struct RequestWithResponse {
    request: Request,
    response_sender: oneshot::Sender<GameResponse>,
}

struct SharedState {
    sender: mpsc::Sender<RequestWithResponse>,
}

#[derive(Serialize)]
struct ApiEndpoint {
    path: &'static str,
    method: &'static str,
    description: &'static str,
}

const ENDPOINTS: [ApiEndpoint; 12] = [
    ApiEndpoint { path: "/", method: "GET", description: "Shows this API documentation" },
    ApiEndpoint { path: "/game-state", method: "GET", description: "Get the current state of the game" },
    ApiEndpoint { path: "/players/<name>", method: "GET", description: "A player's own view, with hand and mission" },
    ApiEndpoint { path: "/players", method: "POST", description: "Join the lobby with a name and a free colour" },
    ApiEndpoint { path: "/players/remove", method: "POST", description: "Leave the lobby, freeing the colour" },
    ApiEndpoint { path: "/start", method: "POST", description: "Deal the map and missions and begin the first turn" },
    ApiEndpoint { path: "/reinforce", method: "POST", description: "Place armies from the pool on an owned territory" },
    ApiEndpoint { path: "/attack", method: "POST", description: "Roll one exchange of dice against a neighbour" },
    ApiEndpoint { path: "/move_units", method: "POST", description: "Fortify a neighbouring territory and end the turn" },
    ApiEndpoint { path: "/turn_in_cards", method: "POST", description: "Trade three cards for armies" },
    ApiEndpoint { path: "/end_phase", method: "POST", description: "Finish the current phase" },
    ApiEndpoint { path: "/new-game", method: "POST", description: "Replace the session, optionally seeded or on another map" },
];

#[get("/")]
fn api_documentation() -> content::RawJson<String> {
    let body = serde_json::to_string_pretty(&ENDPOINTS).unwrap_or_default();
    content::RawJson(body)
}

#[get("/players/<name>")]
async fn player(name: String, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::GetPlayer(name)).await
}

#[post("/players", data = "<data>")]
async fn add_player(data: Json<AddPlayerData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::AddPlayer(data.into_inner())).await
}

#[post("/players/remove", data = "<data>")]
async fn remove_player(data: Json<RemovePlayerData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::RemovePlayer(data.into_inner())).await
}

#[post("/start")]
async fn start_game(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::StartGame).await
}

#[post("/reinforce", data = "<data>")]
async fn reinforce(data: Json<ReinforceData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Reinforce(data.into_inner())).await
}

#[post("/attack", data = "<data>")]
async fn attack(data: Json<AttackData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::Attack(data.into_inner())).await
}

#[post("/move_units", data = "<data>")]
async fn move_units(data: Json<MoveUnitsData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::MoveUnits(data.into_inner())).await
}

#[post("/turn_in_cards", data = "<data>")]
async fn turn_in_cards(data: Json<TurnInCardsData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::TurnInCards(data.into_inner())).await
}

#[post("/end_phase", data = "<data>")]
async fn end_phase(data: Json<EndPhaseData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::EndPhase(data.into_inner())).await
}

#[post("/new-game", data = "<data>")]
async fn new_game(data: Json<NewGameData>, state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::NewGame(data.into_inner())).await
}

#[get("/game-state")]
async fn game_state(state: &State<SharedState>) -> Json<GameResponse> {
    send_request_and_wait(state, Request::GetGameState).await
}

async fn send_request_and_wait(state: &State<SharedState>, request: Request) -> Json<GameResponse> {
    let (response_sender, response_receiver) = oneshot::channel();
    let queued = state
        .sender
        .send(RequestWithResponse {
            request,
            response_sender,
        })
        .await;
    if queued.is_err() {
        error!("game worker has stopped, dropping request");
        return Json(GameResponse::unavailable());
    }

    Json(response_receiver.await.unwrap_or_else(|_| GameResponse::unavailable()))
}

/// Fresh session on the given map (classic if none), with the precomputed
/// odds table when one sits next to the binary.
fn new_session(settings: GameSettings, map_file: Option<&str>) -> Result<Game, MapError> {
    let config = match map_file {
        Some(path) => GameConfig::load_from_file(path)?,
        None => GameConfig::classic()?,
    };
    let game = Game::new(config.to_board()?, settings);
    match OddsTable::load(DEFAULT_TABLE_FILE) {
        Ok(table) => Ok(game.with_odds_table(table)),
        Err(e) => {
            debug!(error = %e, "no odds table loaded, computing on demand");
            Ok(game)
        }
    }
}

fn to_payload<T: Serialize>(result: Result<T, GameError>) -> Result<Value, String> {
    result
        .map(|value| serde_json::to_value(value).unwrap_or(Value::Null))
        .map_err(|e| e.to_string())
}

fn handle(game: &mut Game, default_map: Option<&str>, request: Request) -> Result<Value, String> {
    match request {
        Request::AddPlayer(data) => to_payload(game.add_player(&data.name, data.color)),
        Request::RemovePlayer(data) => to_payload(game.remove_player(&data.name)),
        Request::StartGame => to_payload(game.start_game()),
        Request::Reinforce(data) => {
            to_payload(game.place_reinforcements(&data.player, &data.territory, data.units))
        }
        Request::Attack(data) => to_payload(game.attack(
            &data.player,
            &data.from_territory,
            &data.to_territory,
            data.attack_units,
            data.defend_units,
        )),
        Request::MoveUnits(data) => to_payload(game.move_units(
            &data.player,
            &data.from_territory,
            &data.to_territory,
            data.units,
        )),
        Request::TurnInCards(data) => to_payload(game.turn_in_cards(&data.player, data.cards)),
        Request::EndPhase(data) => to_payload(game.end_phase(&data.player)),
        Request::NewGame(data) => {
            let settings = GameSettings {
                seed: data.seed,
                starting_armies: data.starting_armies,
            };
            let map = data.config_file.as_deref().or(default_map);
            let fresh = new_session(settings, map).map_err(|e| e.to_string())?;
            *game = fresh;
            info!(map = ?map, "new game created");
            Ok(Value::Null)
        }
        Request::GetGameState => Ok(Value::Null),
        Request::GetPlayer(name) => to_payload(game.player_info(&name)),
    }
}

async fn worker_task(
    mut receiver: mpsc::Receiver<RequestWithResponse>,
    mut game: Game,
    default_map: Option<String>,
) {
    while let Some(RequestWithResponse {
        request,
        response_sender,
    }) = receiver.recv().await
    {
        debug!(?request, "handling request");
        let result = handle(&mut game, default_map.as_deref(), request);
        if let Err(e) = &result {
            warn!(error = %e, "command rejected");
        }

        let (result, error) = match result {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e)),
        };
        let response = GameResponse {
            game_state: Some(game.game_state()),
            events: game.drain_events(),
            result,
            error,
        };
        if response_sender.send(response).is_err() {
            warn!("client went away before the response was sent");
        }
    }
}

#[launch]
async fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let default_map = std::env::var(MAP_FILE_ENV).ok();
    let game = new_session(GameSettings::default(), default_map.as_deref()).expect("failed to load the map");
    info!(map = ?default_map, territories = game.board().territories.len(), "game session ready");

    let (sender, receiver) = mpsc::channel::<RequestWithResponse>(100);
    tokio::spawn(worker_task(receiver, game, default_map));

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("Error creating CORS middleware");

    rocket::build()
        .manage(SharedState { sender })
        .mount(
            "/",
            routes![
                api_documentation,
                player,
                add_player,
                remove_player,
                start_game,
                reinforce,
                attack,
                move_units,
                turn_in_cards,
                end_phase,
                new_game,
                game_state
            ],
        )
        .attach(cors)
}
