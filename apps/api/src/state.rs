use congregate_application::{
    AuthEventService, DirectoryService, SecurityAdminService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub security_admin_service: SecurityAdminService,
    pub directory_service: DirectoryService,
    pub user_service: UserService,
    pub auth_event_service: AuthEventService,
    pub frontend_url: String,
}
