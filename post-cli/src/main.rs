use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use post_client::{
    AuthResponse, BlogClient, BlogClientError, ListPostsParams, NewPost, Post, PostChanges,
    PostPage, TokenStore, User,
};
use serde::Serialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";
const DEFAULT_TOKEN_FILE: &str = ".post_token";

#[derive(Debug, Parser)]
#[command(name = "post-cli", version, about = "Command-line client for post-server")]
struct Cli {
    /// Server address; `http://` is added when no scheme is given.
    #[arg(long, global = true, env = "POST_API_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// File holding the bearer token between runs.
    #[arg(long, global = true, env = "POST_TOKEN_FILE", default_value = DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,

    /// Print raw JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account and store its token.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to `--password`.
        #[arg(long)]
        password_confirmation: Option<String>,
    },
    /// Log in and store the token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Revoke the stored token.
    Logout,
    /// Show the account behind the stored token.
    Whoami,
    /// List your posts, newest first.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
        /// Case-insensitive title substring.
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Show a post by UUID or slug.
    Get { id: String },
    /// Create a post.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Derived from the title when omitted.
        #[arg(long)]
        slug: Option<String>,
    },
    /// Change title and/or content of a post (by UUID or slug).
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a post by UUID or slug.
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let server = normalize_server(cli.server);
    let mut client = BlogClient::new(&server).map_err(map_client_error)?;
    let store = TokenStore::new(&cli.token_file);

    if let Some(token) = store
        .load()
        .with_context(|| format!("failed to read {}", store.path().display()))?
    {
        client.set_token(token);
    }

    let output = Output { json: cli.json };

    match cli.command {
        Command::Register {
            name,
            email,
            password,
            password_confirmation,
        } => {
            let confirmation = password_confirmation.unwrap_or_else(|| password.clone());
            let auth = client
                .register(&name, &email, &password, &confirmation)
                .await
                .map_err(map_client_error)?;
            store.save(&auth.access_token).context("failed to store token")?;
            output.auth("Registered", &auth)?;
        }
        Command::Login { email, password } => {
            let auth = client
                .login(&email, &password)
                .await
                .map_err(map_client_error)?;
            store.save(&auth.access_token).context("failed to store token")?;
            output.auth("Logged in", &auth)?;
        }
        Command::Logout => {
            let result = client.logout().await;
            // the local token is useless either way
            store.clear().context("failed to remove token")?;
            println!("{}", result.map_err(map_client_error)?);
        }
        Command::Whoami => {
            let user = client.current_user().await.map_err(map_client_error)?;
            output.user(&user)?;
        }
        Command::List {
            page,
            per_page,
            title,
            slug,
            user_id,
        } => {
            let params = ListPostsParams {
                page: Some(page),
                per_page: Some(per_page),
                title,
                slug,
                user_id,
            };
            let page = client
                .list_posts(&params)
                .await
                .map_err(map_client_error)?;
            output.page(&page)?;
        }
        Command::Get { id } => {
            let post = client.get_post(&id).await.map_err(map_client_error)?;
            output.post("Post", &post)?;
        }
        Command::Create {
            title,
            content,
            slug,
        } => {
            let post = client
                .create_post(&NewPost {
                    title,
                    content,
                    slug,
                })
                .await
                .map_err(map_client_error)?;
            output.post("Post created", &post)?;
        }
        Command::Update { id, title, content } => {
            if title.is_none() && content.is_none() {
                anyhow::bail!("nothing to update: pass --title and/or --content");
            }
            let post = client
                .update_post(&id, &PostChanges { title, content })
                .await
                .map_err(map_client_error)?;
            output.post("Post updated", &post)?;
        }
        Command::Delete { id } => {
            let message = client.delete_post(&id).await.map_err(map_client_error)?;
            println!("{message}");
        }
    }

    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match &err {
        BlogClientError::Unauthorized => {
            "not logged in or token expired: run `post-cli login ...` or `post-cli register ...`"
                .to_string()
        }
        BlogClientError::Forbidden(_) => "this post belongs to another user".to_string(),
        BlogClientError::NotFound(message) => message.clone(),
        BlogClientError::Validation { message, .. } => {
            let mut lines = vec![message.clone()];
            lines.extend(err.field_messages().into_iter().map(|line| format!("  {line}")));
            lines.join("\n")
        }
        _ => err.to_string(),
    };
    anyhow::anyhow!(message)
}

struct Output {
    json: bool,
}

impl Output {
    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn auth(&self, title: &str, auth: &AuthResponse) -> Result<()> {
        if self.json {
            return self.print_json(auth);
        }
        println!("{title}");
        println!("token: {}", auth.access_token);
        print_user(&auth.user);
        Ok(())
    }

    fn user(&self, user: &User) -> Result<()> {
        if self.json {
            return self.print_json(user);
        }
        print_user(user);
        Ok(())
    }

    fn post(&self, title: &str, post: &Post) -> Result<()> {
        if self.json {
            return self.print_json(post);
        }
        println!("{title}");
        println!("id: {}", post.id);
        println!("slug: {}", post.slug);
        println!("title: {}", post.title);
        println!("content: {}", post.content);
        println!("author: {} <{}>", post.user.name, post.user.email);
        println!("created_at: {}", post.created_at);
        println!("updated_at: {}", post.updated_at);
        Ok(())
    }

    fn page(&self, page: &PostPage) -> Result<()> {
        if self.json {
            return self.print_json(page);
        }
        println!("{}", page_summary(page));
        for post in &page.data {
            println!("- [{}] {} ({})", post.slug, post.title, post.created_at);
        }
        Ok(())
    }
}

fn print_user(user: &User) {
    println!("user:");
    println!("  id: {}", user.id);
    println!("  name: {}", user.name);
    println!("  email: {}", user.email);
    println!("  created_at: {}", user.created_at);
}

fn page_summary(page: &PostPage) -> String {
    format!(
        "Page {}/{} ({} per page, {} total)",
        page.current_page, page.last_page, page.per_page, page.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:8080".to_string());
        assert_eq!(s, "https://example.com:8080");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:8000".to_string());
        assert_eq!(s, "http://127.0.0.1:8000");
    }

    #[test]
    fn cli_parses_update_by_slug() {
        let cli = Cli::try_parse_from([
            "post-cli",
            "--token-file",
            "/tmp/token",
            "update",
            "hello-world",
            "--title",
            "New",
        ])
        .expect("parse");
        assert_eq!(cli.token_file, PathBuf::from("/tmp/token"));
        match cli.command {
            Command::Update { id, title, content } => {
                assert_eq!(id, "hello-world");
                assert_eq!(title.as_deref(), Some("New"));
                assert!(content.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn validation_error_lists_fields() {
        let err = BlogClientError::Validation {
            message: "The given data was invalid.".to_string(),
            errors: [("title".to_string(), vec!["must be 1..255 chars".to_string()])]
                .into_iter()
                .collect(),
        };
        let rendered = map_client_error(err).to_string();
        assert_eq!(
            rendered,
            "The given data was invalid.\n  title: must be 1..255 chars"
        );
    }

    #[test]
    fn page_summary_shows_position() {
        let page = PostPage {
            data: vec![],
            current_page: 2,
            last_page: 3,
            per_page: 10,
            total: 25,
        };
        assert_eq!(page_summary(&page), "Page 2/3 (10 per page, 25 total)");
    }
}
