use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RegistryError;
use crate::member::{Member, SkillTier};
use crate::registry::MemberRegistry;
use crate::schedule::{
    generate_best_schedules, verify_schedule, DayIndex, GenerationRequest, VerificationRow,
    DEFAULT_TOP_N,
};

/// Fewer members than this cannot staff a weekend day
pub const MIN_MEMBERS_FOR_GENERATION: usize = 4;

pub struct AppState {
    pub registry: Mutex<MemberRegistry>,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
pub struct MemberView {
    name: String,
    top_tier: SkillTier,
    can_dishwash: bool,
    score: u32,
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            top_tier: member.top_tier,
            can_dishwash: member.can_dishwash,
            score: member.score(),
        }
    }
}

#[derive(Deserialize)]
pub struct AddMemberRequest {
    name: String,
    top_tier: SkillTier,
    #[serde(default)]
    can_dishwash: bool,
}

#[derive(Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    off_days: HashMap<String, BTreeSet<DayIndex>>,
    #[serde(default)]
    no_dishwasher_days: BTreeSet<DayIndex>,
    #[serde(default)]
    public_holidays: BTreeSet<DayIndex>,
    top_n: Option<usize>,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    success: bool,
    message: String,
    extra_shifts: u32,
    search_capped: bool,
    schedules: Vec<ScheduleView>,
}

#[derive(Serialize)]
pub struct ScheduleView {
    red_day_variance: f64,
    team_strength_variance: f64,
    days: Vec<DayView>,
    verification: Vec<VerificationRow>,
}

#[derive(Serialize)]
pub struct DayView {
    day: String,
    members: Vec<String>,
    size: usize,
}

fn lock_registry(state: &AppState) -> Result<MutexGuard<'_, MemberRegistry>> {
    state
        .registry
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("member registry unavailable"))
}

fn is_admin(req: &HttpRequest, state: &AppState) -> bool {
    req.headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|password| password == state.admin_password)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"}))
}

fn registry_error(err: RegistryError) -> HttpResponse {
    let body = serde_json::json!({"success": false, "error": err.to_string()});
    match err {
        RegistryError::DuplicateMember(_) => HttpResponse::Conflict().json(body),
        RegistryError::UnknownMember(_) => HttpResponse::NotFound().json(body),
        RegistryError::UnknownTier(_) => HttpResponse::BadRequest().json(body),
        RegistryError::Io(_) | RegistryError::Csv(_) => HttpResponse::InternalServerError().json(body),
    }
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

async fn list_members(state: web::Data<AppState>) -> Result<HttpResponse> {
    let registry = lock_registry(&state)?;
    let members: Vec<MemberView> = registry.members().iter().map(MemberView::from).collect();
    Ok(HttpResponse::Ok().json(members))
}

async fn add_member(
    req: HttpRequest,
    body: web::Json<AddMemberRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }

    let body = body.into_inner();
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": "Member name is required"})));
    }

    let member = Member::new(name, body.top_tier, body.can_dishwash);
    let view = MemberView::from(&member);
    let mut registry = lock_registry(&state)?;
    if let Err(e) = registry.add_and_save(member) {
        return Ok(registry_error(e));
    }
    info!(name = %view.name, tier = %view.top_tier, "member added");

    Ok(HttpResponse::Created().json(view))
}

async fn remove_member(
    req: HttpRequest,
    name: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized());
    }

    let mut registry = lock_registry(&state)?;
    if let Err(e) = registry.remove_and_save(name.as_str()) {
        return Ok(registry_error(e));
    }
    info!(name = %name.as_str(), "member removed");

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn generate_schedules(
    body: web::Json<ScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let members = lock_registry(&state)?.members().to_vec();
    if members.len() < MIN_MEMBERS_FOR_GENERATION {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("At least {} members are needed to generate a schedule", MIN_MEMBERS_FOR_GENERATION)
        })));
    }

    let body = body.into_inner();
    let request = GenerationRequest {
        members,
        off_days: body.off_days,
        no_dishwasher_days: body.no_dishwasher_days,
        public_holidays: body.public_holidays,
        top_n: body.top_n.unwrap_or(DEFAULT_TOP_N),
    };

    // the search is CPU bound, keep it off the async workers
    let response = web::block(move || {
        let outcome = generate_best_schedules(&request);
        let schedules = outcome
            .schedules
            .iter()
            .map(|ranked| ScheduleView {
                red_day_variance: ranked.red_day_variance,
                team_strength_variance: ranked.team_strength_variance,
                days: ranked
                    .schedule
                    .days()
                    .map(|(day, team)| DayView {
                        day: day.name().to_string(),
                        members: team.members.iter().map(|m| m.name.clone()).collect(),
                        size: team.len(),
                    })
                    .collect(),
                verification: verify_schedule(&request, &ranked.schedule),
            })
            .collect();
        ScheduleResponse {
            success: outcome.success,
            message: outcome.message,
            extra_shifts: outcome.extra_shifts,
            search_capped: outcome.search_capped,
            schedules,
        }
    })
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Routes shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/login", web::post().to(admin_login))
        .route("/api/members", web::get().to(list_members))
        .route("/api/members", web::post().to(add_member))
        .route("/api/members/{name}", web::delete().to(remove_member))
        .route("/api/schedules", web::post().to(generate_schedules));
}

pub async fn start_server(
    port: u16,
    admin_password: String,
    registry: MemberRegistry,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        registry: Mutex::new(registry),
        admin_password,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use tempfile::TempDir;

    const PASSWORD: &str = "secret";

    fn state(dir: &TempDir, members: &[Member]) -> web::Data<AppState> {
        let mut registry = MemberRegistry::open(dir.path().join("members.csv")).unwrap();
        for member in members {
            registry.add(member.clone()).unwrap();
        }
        web::Data::new(AppState {
            registry: Mutex::new(registry),
            admin_password: PASSWORD.to_string(),
        })
    }

    fn kitchen() -> Vec<Member> {
        vec![
            Member::new("ora", SkillTier::Ordering, false),
            Member::new("oli", SkillTier::Ordering, false),
            Member::new("max", SkillTier::Main, false),
            Member::new("mia", SkillTier::Main, false),
            Member::new("sam", SkillTier::Sub, false),
        ]
    }

    #[actix_web::test]
    async fn adding_requires_password_and_persists() {
        let dir = TempDir::new().unwrap();
        let data = state(&dir, &[]);
        let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

        let body = serde_json::json!({"name": "Jisoo", "top_tier": "ordering", "can_dishwash": true});
        let req = test::TestRequest::post().uri("/api/members").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/members")
            .insert_header(("X-Admin-Password", PASSWORD))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/members")
            .insert_header(("X-Admin-Password", PASSWORD))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let reloaded = MemberRegistry::open(dir.path().join("members.csv")).unwrap();
        assert_eq!(reloaded.members().len(), 1);
    }

    #[actix_web::test]
    async fn lists_and_removes_members() {
        let dir = TempDir::new().unwrap();
        let data = state(&dir, &kitchen());
        let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/members").to_request();
        let members: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(members.as_array().unwrap().len(), 5);
        assert_eq!(members[0]["score"], 4);

        let req = test::TestRequest::delete()
            .uri("/api/members/sam")
            .insert_header(("X-Admin-Password", PASSWORD))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri("/api/members/sam")
            .insert_header(("X-Admin-Password", PASSWORD))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn failed_save_keeps_listing_unchanged() {
        let dir = TempDir::new().unwrap();
        let registry = MemberRegistry::open(dir.path().join("gone").join("members.csv")).unwrap();
        let data = web::Data::new(AppState {
            registry: Mutex::new(registry),
            admin_password: PASSWORD.to_string(),
        });
        let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

        let body = serde_json::json!({"name": "Jisoo", "top_tier": "ordering"});
        let req = test::TestRequest::post()
            .uri("/api/members")
            .insert_header(("X-Admin-Password", PASSWORD))
            .set_json(&body)
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let req = test::TestRequest::get().uri("/api/members").to_request();
        let members: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(members.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn index_page_offers_admin_login() {
        let dir = TempDir::new().unwrap();
        let data = state(&dir, &[]);
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let page = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
        assert!(page.contains("/api/login"));
        assert!(page.contains("id=\"add-member\""));
        // member names reach the page through textContent only
        assert!(!page.contains("innerHTML"));

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(serde_json::json!({"password": "wrong"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(serde_json::json!({"password": PASSWORD}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn generation_needs_enough_members() {
        let dir = TempDir::new().unwrap();
        let data = state(&dir, &kitchen()[..3]);
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/schedules")
            .set_json(serde_json::json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn generates_schedules_with_verification() {
        let dir = TempDir::new().unwrap();
        let data = state(&dir, &kitchen());
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/schedules")
            .set_json(serde_json::json!({"public_holidays": [2], "top_n": 2}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        let schedules = body["schedules"].as_array().unwrap();
        assert!(!schedules.is_empty() && schedules.len() <= 2);
        assert_eq!(schedules[0]["days"].as_array().unwrap().len(), 7);
        for row in schedules[0]["verification"].as_array().unwrap() {
            assert_eq!(row["target"], row["actual"]);
        }
    }

    #[actix_web::test]
    async fn generation_failure_is_reported_in_body() {
        let dir = TempDir::new().unwrap();
        let data = state(&dir, &kitchen());
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/schedules")
            .set_json(serde_json::json!({"off_days": {"ora": [4], "oli": [4]}}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("Friday"));
    }
}
