// src/handlers/groups.rs
// DOCUMENTATION: Route group mounting for the storefront API
// PURPOSE: Attach externally implemented handler modules under fixed path prefixes

use crate::errors::AppError;
use actix_web::{web, HttpRequest};

/// A set of endpoints sharing one path prefix
/// DOCUMENTATION: `configure` registers the group's routes inside its scope
/// The mount table is fixed at startup and never changes afterwards
#[derive(Clone, Copy)]
pub struct RouteGroup {
    pub name: &'static str,
    pub prefix: &'static str,
    pub configure: fn(&mut web::ServiceConfig),
}

impl RouteGroup {
    /// Group whose handler module has not been attached yet
    pub const fn unattached(name: &'static str, prefix: &'static str) -> Self {
        RouteGroup {
            name,
            prefix,
            configure: no_routes,
        }
    }

    pub const fn with_routes(self, configure: fn(&mut web::ServiceConfig)) -> Self {
        RouteGroup { configure, ..self }
    }
}

fn no_routes(_cfg: &mut web::ServiceConfig) {}

/// Storefront route groups, in mount order
pub const ROUTE_GROUPS: [RouteGroup; 4] = [
    RouteGroup::unattached("products", "/api/products"),
    RouteGroup::unattached("categories", "/api/categories"),
    RouteGroup::unattached("upload", "/api/upload"),
    RouteGroup::unattached("auth", "/api/auth"),
];

/// Mount each group as a scope
/// Requests the group does not handle answer 501 so a missing module is obvious
pub fn mount(cfg: &mut web::ServiceConfig, groups: &[RouteGroup]) {
    for group in groups {
        let name = group.name;
        log::debug!("Mounting route group '{}' at {}", name, group.prefix);

        cfg.service(
            web::scope(group.prefix)
                .configure(group.configure)
                .default_service(web::to(move |req: HttpRequest| async move {
                    log::warn!("No '{}' handler for {} {}", name, req.method(), req.path());
                    Err::<&'static str, AppError>(AppError::RouteGroupUnavailable(name))
                })),
        );
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    mount(cfg, &ROUTE_GROUPS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::testing::lookup_from;
    use crate::config::{init_db_pool, DbSettings};
    use actix_web::{test, App, HttpResponse};
    use sqlx::MySqlPool;

    async fn count_categories(pool: web::Data<MySqlPool>) -> Result<HttpResponse, AppError> {
        sqlx::query("SELECT COUNT(*) FROM categories")
            .execute(pool.get_ref())
            .await?;
        Ok(HttpResponse::Ok().finish())
    }

    fn category_routes(cfg: &mut web::ServiceConfig) {
        cfg.route("/count", web::get().to(count_categories));
    }

    fn list_products(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "",
            web::get().to(|| async { HttpResponse::Ok().json(serde_json::json!([])) }),
        );
    }

    #[actix_web::test]
    async fn test_route_group_prefixes() {
        let prefixes: Vec<&str> = ROUTE_GROUPS.iter().map(|g| g.prefix).collect();
        assert_eq!(
            prefixes,
            vec!["/api/products", "/api/categories", "/api/upload", "/api/auth"]
        );
    }

    #[actix_web::test]
    async fn test_unattached_group_answers_501() {
        let app = test::init_service(App::new().configure(config)).await;

        let req = test::TestRequest::post().uri("/api/auth/login").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 501);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "ROUTE_GROUP_UNAVAILABLE");
    }

    #[actix_web::test]
    async fn test_attached_group_dispatches() {
        let groups = [
            RouteGroup::unattached("products", "/api/products").with_routes(list_products),
            RouteGroup::unattached("auth", "/api/auth"),
        ];
        let app =
            test::init_service(App::new().configure(|cfg| mount(cfg, &groups))).await;

        let req = test::TestRequest::get().uri("/api/products").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get().uri("/api/products/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 501);
    }

    #[actix_web::test]
    async fn test_group_query_errors_use_error_envelope() {
        let settings = DbSettings::from_lookup(lookup_from(&[
            ("DB_HOST", "127.0.0.1"),
            ("DB_PORT", "1"),
            ("DB_CONNECT_TIMEOUT", "500"),
        ]));
        let groups =
            [RouteGroup::unattached("categories", "/api/categories").with_routes(category_routes)];
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(init_db_pool(&settings)))
                .configure(|cfg| mount(cfg, &groups)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/categories/count").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    }
}
