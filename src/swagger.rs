use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::raffle::create_raffle,
        handlers::raffle::list_raffles,
        handlers::raffle::get_raffle,
        handlers::raffle::add_participants,
        handlers::raffle::update_attendance,
        handlers::raffle::draw,
        handlers::raffle::claim,
        handlers::raffle::send_reminders,
        handlers::raffle::add_prize,
        handlers::raffle::update_prize,
        handlers::raffle::delete_prize,
        handlers::raffle::complete_raffle,
        handlers::event::create_event,
        handlers::event::list_events,
        handlers::event::get_event,
        handlers::event::update_event,
        handlers::event::list_guests,
        handlers::event::add_guest,
        handlers::event::list_participants,
        handlers::event::remind_guest,
        handlers::event::update_rsvp,
        handlers::event::check_in,
        handlers::event::scan_check_in,
        handlers::event::bulk_check_in,
        handlers::employee::create_employee,
        handlers::employee::list_employees,
        handlers::employee::get_employee,
        handlers::employee::update_employee,
        handlers::employee::employee_history,
        handlers::module_config::get_module_config,
        handlers::module_config::update_module_config,
    ),
    components(
        schemas(
            ApiError,
            RaffleStatus,
            PrizeTier,
            Prize,
            Participant,
            Raffle,
            PrizeInput,
            CreateRaffleRequest,
            AddParticipantsRequest,
            SkippedParticipant,
            AddParticipantsResponse,
            UpdateAttendanceRequest,
            ClaimRequest,
            ClaimState,
            ClaimOutcome,
            DrawResponse,
            RaffleResponse,
            ReminderResponse,
            EventStatus,
            InvitationStatus,
            EventGuest,
            Event,
            CreateEventRequest,
            UpdateEventRequest,
            UpdateRsvpRequest,
            AddGuestRequest,
            CheckInRequest,
            ScanCheckInRequest,
            BulkCheckInRequest,
            CheckInResponse,
            BulkCheckInResponse,
            EventGuestView,
            GuestType,
            Guest,
            EmployeeStatus,
            Employee,
            CreateEmployeeRequest,
            UpdateEmployeeRequest,
            EmployeeQuery,
            EmployeePage,
            HistoryKind,
            HistoryEntry,
            SettingValue,
            InputKind,
            ModuleSetting,
            ModuleSettingView,
            UpdateModuleConfigRequest,
            ModuleConfigResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "raffle", description = "Raffle draw and claim API"),
        (name = "event", description = "Event guest and check-in API"),
        (name = "employee", description = "Employee directory API"),
        (name = "module", description = "Module settings API"),
        (name = "system", description = "Health check"),
    ),
    info(
        title = "Portal Backend API",
        version = "1.0.0",
        description = "Enterprise portal REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
