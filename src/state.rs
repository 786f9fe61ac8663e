use axum::extract::FromRef;

use crate::{
    config::Config,
    services::{
        ArticleService, CategoryService, CommentService, LikeService, Services, TagService,
        UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub services: Services,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Lets handlers take `State<XService>` directly.
macro_rules! service_from_state {
    ($($service:ty => $field:ident),* $(,)?) => {
        $(
            impl FromRef<AppState> for $service {
                fn from_ref(state: &AppState) -> Self {
                    state.services.$field.clone()
                }
            }
        )*
    };
}

service_from_state! {
    UserService => users,
    ArticleService => articles,
    CommentService => comments,
    LikeService => likes,
    CategoryService => categories,
    TagService => tags,
}
