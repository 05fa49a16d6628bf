use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthError, TokenIssuer};
use crate::config::AppConfig;
use crate::database::models::album::{CreateAlbum, UpdateAlbum};
use crate::database::models::comment::{CreateComment, UpdateComment};
use crate::database::models::photo::{CreatePhoto, UpdatePhoto};
use crate::database::models::post::{CreatePost, UpdatePost};
use crate::database::models::{EntityDescriptor, ALBUMS, COMMENTS, PHOTOS, POSTS};
use crate::database::repository::StorageRepository;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AuthService, ResourceService};

/// Everything a request handler can reach. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn StorageRepository>,
    pub issuer: Arc<TokenIssuer>,
    pub auth: Arc<AuthService>,
    pub posts: Arc<ResourceService>,
    pub comments: Arc<ResourceService>,
    pub albums: Arc<ResourceService>,
    pub photos: Arc<ResourceService>,
}

impl AppState {
    pub fn new(repo: Arc<dyn StorageRepository>, config: &AppConfig) -> Result<Self, AuthError> {
        let issuer = Arc::new(TokenIssuer::from_config(&config.security)?);
        let paging = config.paging_policy();
        let service = |entity: &'static EntityDescriptor| {
            Arc::new(ResourceService::new(entity, repo.clone(), paging))
        };

        Ok(Self {
            auth: Arc::new(AuthService::new(
                repo.clone(),
                issuer.clone(),
                config.security.password_cost,
            )),
            posts: service(&POSTS),
            comments: service(&COMMENTS),
            albums: service(&ALBUMS),
            photos: service(&PHOTOS),
            issuer,
            repo,
        })
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected = Router::new()
        .merge(protected::collection::routes::<CreatePost, UpdatePost>(
            "/posts",
            "post_id",
            state.posts.clone(),
        ))
        .merge(protected::nested::routes::<CreateComment, UpdateComment>(
            "/posts/:post_id/comments",
            "comment_id",
            state.comments.clone(),
        ))
        .merge(protected::collection::routes::<CreateAlbum, UpdateAlbum>(
            "/albums",
            "album_id",
            state.albums.clone(),
        ))
        .merge(protected::nested::routes::<CreatePhoto, UpdatePhoto>(
            "/albums/:album_id/photos",
            "photo_id",
            state.photos.clone(),
        ))
        .route_layer(from_fn_with_state(state.issuer.clone(), jwt_auth_middleware));

    let public = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login", post(public::login))
        .with_state(state);

    let mut router = Router::new().merge(public).merge(protected);

    if config.security.enable_cors {
        router = router.layer(cors(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
