use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::banner::list_banners,
            handlers::banner::create_banner
        ))
        .routes(routes!(
            handlers::banner::update_banner,
            handlers::banner::delete_banner
        ))
        .routes(routes!(handlers::banner::get_user_banner))
        .routes(routes!(handlers::user::create_user))
}
