//! JSON web server embedding the engine: create groups, brackets or group stages from team
//! names and drive them round by round.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! SEED (u64) makes every competition created by this process reproducible.

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tournament_engine::{Bracket, Group, GroupStage, GroupStageSettings, MatchSimulator, Team, TournamentError};
use uuid::Uuid;

type CompetitionId = Uuid;

/// Anything the server can drive one unit of work at a time.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Competition {
    Group(Group),
    Bracket(Bracket),
    GroupStage(GroupStage),
}

impl Competition {
    fn is_complete(&self) -> bool {
        match self {
            Competition::Group(g) => g.is_complete(),
            Competition::Bracket(b) => b.is_complete(),
            Competition::GroupStage(s) => s.is_complete(),
        }
    }

    fn play_next(&mut self, sim: &MatchSimulator, rng: &mut ChaCha8Rng) -> Result<(), TournamentError> {
        match self {
            Competition::Group(g) => g.play_next(sim, rng),
            Competition::Bracket(b) => b.play_next(sim, rng),
            Competition::GroupStage(s) => s.play_next(sim, rng),
        }
    }

    fn play_all(&mut self, sim: &MatchSimulator, rng: &mut ChaCha8Rng) -> Result<(), TournamentError> {
        match self {
            Competition::Group(g) => g.play_all(sim, rng),
            Competition::Bracket(b) => {
                while !b.is_complete() {
                    b.play_next(sim, rng)?;
                }
                Ok(())
            }
            Competition::GroupStage(s) => s.play_all(sim, rng),
        }
    }
}

/// Per-competition entry: the competition, its own random source and last activity time
/// (for auto-cleanup).
struct CompetitionEntry {
    competition: Competition,
    rng: ChaCha8Rng,
    last_activity: Instant,
}

struct Registry {
    competitions: HashMap<CompetitionId, CompetitionEntry>,
    /// Seeds the random source of each new competition.
    seeder: ChaCha8Rng,
}

type AppState = Data<RwLock<Registry>>;
type Simulator = Data<MatchSimulator>;

/// Inactivity threshold: competitions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct CompetitionResponse<'a> {
    id: CompetitionId,
    complete: bool,
    competition: &'a Competition,
}

#[derive(Deserialize)]
struct CreateGroupBody {
    teams: Vec<String>,
    #[serde(default)]
    one_leg: bool,
}

#[derive(Deserialize)]
struct CreateBracketBody {
    teams: Vec<String>,
    #[serde(default)]
    one_leg: bool,
    #[serde(default)]
    one_leg_final: bool,
}

#[derive(Deserialize)]
struct CreateGroupStageBody {
    settings: GroupStageSettings,
    tiers: Vec<Vec<String>>,
}

/// Path segment: competition id (e.g. /api/competitions/{id})
#[derive(Deserialize)]
struct CompetitionPath {
    id: CompetitionId,
}

fn to_teams(names: &[String]) -> Vec<Team> {
    names.iter().map(|n| Team::new(n.trim())).collect()
}

fn respond(id: CompetitionId, competition: &Competition) -> HttpResponse {
    HttpResponse::Ok().json(CompetitionResponse {
        id,
        complete: competition.is_complete(),
        competition,
    })
}

fn bad_request(e: TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" }))
}

/// Build a competition with a fresh random source and store it.
fn register<F>(state: &AppState, build: F) -> HttpResponse
where
    F: FnOnce(&mut ChaCha8Rng) -> Result<Competition, TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let mut rng = ChaCha8Rng::seed_from_u64(g.seeder.gen());
    let competition = match build(&mut rng) {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };
    let id = Uuid::new_v4();
    let response = respond(id, &competition);
    g.competitions.insert(
        id,
        CompetitionEntry {
            competition,
            rng,
            last_activity: Instant::now(),
        },
    );
    log::info!("Created competition {} ({} active)", id, g.competitions.len());
    response
}

/// Play one unit of work, or everything left when `all`.
fn drive(state: &AppState, sim: &MatchSimulator, id: CompetitionId, all: bool) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.competitions.get_mut(&id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let CompetitionEntry { competition, rng, .. } = entry;
    let result = if all {
        competition.play_all(sim, rng)
    } else {
        competition.play_next(sim, rng)
    };
    match result {
        Ok(()) => respond(id, competition),
        Err(e) => bad_request(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-engine",
    })
}

/// Create a round-robin group from team names (in schedule order).
#[post("/api/groups")]
async fn api_create_group(state: AppState, body: Json<CreateGroupBody>) -> HttpResponse {
    register(&state, |_| Group::new(to_teams(&body.teams), body.one_leg).map(Competition::Group))
}

/// Create a knockout bracket; teams listed first are the first to get byes.
#[post("/api/brackets")]
async fn api_create_bracket(state: AppState, body: Json<CreateBracketBody>) -> HttpResponse {
    register(&state, |rng| {
        Bracket::new(to_teams(&body.teams), body.one_leg, body.one_leg_final, rng).map(Competition::Bracket)
    })
}

/// Create a group stage from seed tiers (strongest tier first).
#[post("/api/group-stages")]
async fn api_create_group_stage(state: AppState, body: Json<CreateGroupStageBody>) -> HttpResponse {
    let body = body.into_inner();
    let tiers = body.tiers.iter().map(|tier| to_teams(tier)).collect();
    register(&state, |rng| GroupStage::new(body.settings, tiers, rng).map(Competition::GroupStage))
}

/// Get a competition by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/competitions/{id}")]
async fn api_get_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.competitions.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            respond(path.id, &entry.competition)
        }
        None => not_found(),
    }
}

/// Play the next round (group), leg (bracket) or step (group stage).
#[post("/api/competitions/{id}/play")]
async fn api_play(state: AppState, sim: Simulator, path: Path<CompetitionPath>) -> HttpResponse {
    drive(&state, &sim, path.id, false)
}

/// Play until the competition is complete.
#[post("/api/competitions/{id}/play-all")]
async fn api_play_all(state: AppState, sim: Simulator, path: Path<CompetitionPath>) -> HttpResponse {
    drive(&state, &sim, path.id, true)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let seeder = match std::env::var("SEED").ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => {
            log::info!("Using fixed seed {}", seed);
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(Registry {
        competitions: HashMap::new(),
        seeder,
    }));
    let simulator = Data::new(MatchSimulator::default());

    // Background task: every 30 minutes, remove competitions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.competitions.len();
            g.competitions
                .retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.competitions.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive competition(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(simulator.clone())
            .service(api_health)
            .service(api_create_group)
            .service(api_create_bracket)
            .service(api_create_group_stage)
            .service(api_get_competition)
            .service(api_play)
            .service(api_play_all)
    })
    .bind(bind)?
    .run()
    .await
}
