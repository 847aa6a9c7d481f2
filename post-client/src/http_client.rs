use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{AuthResponse, ListPostsParams, NewPost, Post, PostChanges, PostPage, User};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    password_confirmation: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct DataDto<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MessageDto {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorsDto {
    Message(String),
    Fields(BTreeMap<String, Vec<String>>),
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
    errors: Option<ErrorsDto>,
}

#[derive(Debug, Clone)]
/// Thin REST client; the caller decides which token to attach.
pub(crate) struct HttpClient {
    base_url: Url,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: &str) -> BlogClientResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|err| BlogClientError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BlogClientError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> BlogClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BlogClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn post_url(&self, id_or_slug: &str) -> BlogClientResult<Url> {
        self.url(&["api", "v1", "posts", id_or_slug])
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> BlogClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await?;
            debug!(%status, "request rejected");
            return Err(error_from_body(status, &body));
        }
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> BlogClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            name,
            email,
            password,
            password_confirmation,
        };
        let url = self.url(&["api", "register"])?;
        Self::send(self.request(Method::POST, url, None).json(&payload)).await
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let payload = LoginRequestDto { email, password };
        let url = self.url(&["api", "login"])?;
        Self::send(self.request(Method::POST, url, None).json(&payload)).await
    }

    pub(crate) async fn logout(&self, token: &str) -> BlogClientResult<String> {
        let url = self.url(&["api", "logout"])?;
        let dto: MessageDto = Self::send(self.request(Method::POST, url, Some(token))).await?;
        Ok(dto.message)
    }

    pub(crate) async fn current_user(&self, token: &str) -> BlogClientResult<User> {
        let url = self.url(&["api", "user"])?;
        Self::send(self.request(Method::GET, url, Some(token))).await
    }

    pub(crate) async fn list_posts(
        &self,
        token: &str,
        params: &ListPostsParams,
    ) -> BlogClientResult<PostPage> {
        let url = self.url(&["api", "v1", "posts"])?;
        Self::send(self.request(Method::GET, url, Some(token)).query(params)).await
    }

    pub(crate) async fn get_post(&self, token: &str, id_or_slug: &str) -> BlogClientResult<Post> {
        let url = self.post_url(id_or_slug)?;
        let dto: DataDto<Post> = Self::send(self.request(Method::GET, url, Some(token))).await?;
        Ok(dto.data)
    }

    pub(crate) async fn create_post(&self, token: &str, post: &NewPost) -> BlogClientResult<Post> {
        let url = self.url(&["api", "v1", "posts"])?;
        let dto: DataDto<Post> =
            Self::send(self.request(Method::POST, url, Some(token)).json(post)).await?;
        Ok(dto.data)
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id_or_slug: &str,
        changes: &PostChanges,
    ) -> BlogClientResult<Post> {
        let url = self.post_url(id_or_slug)?;
        let dto: DataDto<Post> =
            Self::send(self.request(Method::PUT, url, Some(token)).json(changes)).await?;
        Ok(dto.data)
    }

    pub(crate) async fn delete_post(&self, token: &str, id_or_slug: &str) -> BlogClientResult<String> {
        let url = self.post_url(id_or_slug)?;
        let dto: MessageDto = Self::send(self.request(Method::DELETE, url, Some(token))).await?;
        Ok(dto.message)
    }
}

/// Reads `{"errors": "..."}` and `{"message": "...", "errors": {field: [..]}}` bodies.
fn error_from_body(status: StatusCode, body: &[u8]) -> BlogClientError {
    let (message, fields) = match serde_json::from_slice::<ErrorResponseDto>(body) {
        Ok(ErrorResponseDto {
            errors: Some(ErrorsDto::Message(message)),
            ..
        }) => (Some(message), BTreeMap::new()),
        Ok(ErrorResponseDto {
            message,
            errors: Some(ErrorsDto::Fields(fields)),
        }) => (message, fields),
        Ok(ErrorResponseDto { message, .. }) => (message, BTreeMap::new()),
        Err(_) => (None, BTreeMap::new()),
    };
    BlogClientError::from_http_status(status, message, fields)
}
