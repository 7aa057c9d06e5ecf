use axum::Router;
use axum::routing::{get, post};

use catalog_products::{Brand, Category, Manufacturer, Product, Variant};

pub mod crud;
pub mod system;
pub mod tokens;
pub mod users;
pub mod variants;

/// Router for every endpoint behind the auth middleware.
///
/// Each route decides through its permission policy whether anonymous
/// callers are acceptable.
pub fn router() -> Router {
    Router::new()
        .route("/user/create/", post(users::create).fallback(system::method_not_allowed))
        .route(
            "/user/me/",
            get(users::me)
                .put(users::update_me)
                .patch(users::update_me)
                .options(users::describe_me)
                .fallback(system::method_not_allowed),
        )
        .route("/token/", post(tokens::obtain).fallback(system::method_not_allowed))
        .route("/token/refresh/", post(tokens::refresh).fallback(system::method_not_allowed))
        .merge(crud::routes::<Manufacturer>("/manufacturer"))
        .merge(crud::routes::<Brand>("/brand"))
        .merge(crud::routes::<Category>("/category"))
        .merge(crud::routes::<Product>("/product"))
        .route(
            "/variant/",
            crud::collection::<Variant>()
                .post(variants::create)
                .fallback(system::method_not_allowed),
        )
        .route("/variant/:id/", crud::instance::<Variant>())
}
