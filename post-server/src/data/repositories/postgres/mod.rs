pub(crate) mod post_repository;
pub(crate) mod user_repository;
