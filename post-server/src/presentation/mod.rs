use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;

pub(crate) mod http;

pub(crate) type DynPostRepository = Arc<dyn PostRepository>;
pub(crate) type DynUserRepository = Arc<dyn UserRepository>;

/// Services shared by every request. Each persistence capability is bound to
/// one concrete repository when the state is built.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<DynUserRepository>>,
    pub(crate) blog_service: Arc<BlogService<DynPostRepository>>,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<AuthService<DynUserRepository>>,
        blog_service: Arc<BlogService<DynPostRepository>>,
    ) -> Self {
        Self {
            auth_service,
            blog_service,
        }
    }
}
