//! Blog service
//!
//! Implements the blog mutation contract:
//! - List and fetch blogs (no authorization)
//! - Create blogs (bearer token required, creator taken from the token)
//! - Update blogs (no token required)
//! - Delete blogs (bearer token required, ownership per `OwnershipPolicy`)

use crate::config::OwnershipPolicy;
use crate::db::repositories::Repository;
use crate::models::{Blog, CreateBlogInput, Identity, UpdateBlogInput};
use crate::services::token::{TokenError, TokenService};
use anyhow::Context;
use std::sync::Arc;

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// Blog not found
    #[error("blog not found: {0}")]
    NotFound(String),

    /// Invalid payload
    #[error("{0}")]
    ValidationError(String),

    /// Protected mutation attempted without a token
    #[error("token missing")]
    MissingToken,

    /// Token present but unverifiable
    #[error("token invalid")]
    InvalidToken,

    /// Token identity does not own the blog
    #[error("only the creator can delete this blog")]
    Forbidden,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<TokenError> for BlogServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => BlogServiceError::MissingToken,
            TokenError::Invalid(reason) => {
                tracing::debug!("Rejected bearer token: {}", reason);
                BlogServiceError::InvalidToken
            }
            TokenError::Signing(e) => BlogServiceError::InternalError(anyhow::anyhow!(e)),
        }
    }
}

/// Blog service for managing blog records
pub struct BlogService {
    blog_repo: Arc<dyn Repository<Blog>>,
    tokens: TokenService,
    ownership: OwnershipPolicy,
}

impl BlogService {
    /// Create a new blog service with the default (strict) ownership policy
    pub fn new(blog_repo: Arc<dyn Repository<Blog>>, tokens: TokenService) -> Self {
        Self::with_ownership(blog_repo, tokens, OwnershipPolicy::default())
    }

    pub fn with_ownership(
        blog_repo: Arc<dyn Repository<Blog>>,
        tokens: TokenService,
        ownership: OwnershipPolicy,
    ) -> Self {
        Self {
            blog_repo,
            tokens,
            ownership,
        }
    }

    /// List all blogs in insertion order
    pub async fn list(&self) -> Result<Vec<Blog>, BlogServiceError> {
        let blogs = self.blog_repo.list().await.context("Failed to list blogs")?;
        Ok(blogs)
    }

    /// Get a blog by ID
    pub async fn get(&self, id: &str) -> Result<Blog, BlogServiceError> {
        self.blog_repo
            .get(id)
            .await
            .context("Failed to get blog")?
            .ok_or_else(|| BlogServiceError::NotFound(id.to_string()))
    }

    /// Create a new blog on behalf of the token's identity
    ///
    /// The token is checked before the payload, so an unauthenticated request
    /// never reports validation details.
    ///
    /// # Errors
    ///
    /// - `MissingToken` / `InvalidToken` if the token is absent or unverifiable
    /// - `ValidationError` if `title` or `url` is missing or empty, or `likes` is negative
    /// - `InternalError` for database errors
    pub async fn create(
        &self,
        input: CreateBlogInput,
        token: Option<&str>,
    ) -> Result<Blog, BlogServiceError> {
        let identity = self.tokens.verify(token)?;

        let title = required_field("title", input.title)?;
        let url = required_field("url", input.url)?;
        let likes = match input.likes {
            Some(likes) => validate_likes(likes)?,
            None => 0,
        };

        let mut blog = Blog::new(title, input.author.unwrap_or_default(), url, likes)
            .with_creator(identity.id.as_str());

        blog.id = self
            .blog_repo
            .insert(&blog)
            .await
            .context("Failed to create blog")?;

        tracing::info!("Blog {} created by {}", blog.id, identity.username);
        Ok(blog)
    }

    /// Update the supplied fields of a blog
    ///
    /// No token is required. Supplied fields go through the same checks as
    /// on creation; absent fields are left unchanged.
    pub async fn update(&self, id: &str, input: UpdateBlogInput) -> Result<Blog, BlogServiceError> {
        let mut blog = self.get(id).await?;

        if let Some(title) = input.title {
            blog.title = required_field("title", Some(title))?;
        }
        if let Some(url) = input.url {
            blog.url = required_field("url", Some(url))?;
        }
        if let Some(author) = input.author {
            blog.author = author;
        }
        if let Some(likes) = input.likes {
            blog.likes = validate_likes(likes)?;
        }

        let updated = self
            .blog_repo
            .update(id, &blog)
            .await
            .context("Failed to update blog")?;
        if !updated {
            return Err(BlogServiceError::NotFound(id.to_string()));
        }

        tracing::debug!("Blog {} updated", id);
        Ok(blog)
    }

    /// Delete a blog
    ///
    /// # Errors
    ///
    /// - `MissingToken` / `InvalidToken` if the token is absent or unverifiable
    /// - `NotFound` if no blog has this ID
    /// - `Forbidden` if the ownership policy rejects the token identity
    pub async fn delete(&self, id: &str, token: Option<&str>) -> Result<(), BlogServiceError> {
        let identity = self.tokens.verify(token)?;
        let blog = self.get(id).await?;

        self.check_ownership(&blog, &identity)?;

        let deleted = self
            .blog_repo
            .delete(id)
            .await
            .context("Failed to delete blog")?;
        if !deleted {
            return Err(BlogServiceError::NotFound(id.to_string()));
        }

        tracing::info!("Blog {} deleted by {}", id, identity.username);
        Ok(())
    }

    fn check_ownership(&self, blog: &Blog, identity: &Identity) -> Result<(), BlogServiceError> {
        match (self.ownership, blog.creator.as_deref()) {
            (OwnershipPolicy::TokenOnly, _) | (OwnershipPolicy::Strict, None) => Ok(()),
            (OwnershipPolicy::Strict, Some(creator)) if creator == identity.id => Ok(()),
            (OwnershipPolicy::Strict, Some(_)) => {
                tracing::warn!(
                    "User {} attempted to delete blog {} owned by someone else",
                    identity.username,
                    blog.id
                );
                Err(BlogServiceError::Forbidden)
            }
        }
    }
}

/// Require a present, non-blank string field
fn required_field(name: &str, value: Option<String>) -> Result<String, BlogServiceError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BlogServiceError::ValidationError(format!(
            "`{}` is required",
            name
        ))),
    }
}

fn validate_likes(likes: i64) -> Result<u64, BlogServiceError> {
    u64::try_from(likes).map_err(|_| {
        BlogServiceError::ValidationError("`likes` must not be negative".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxBlogRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::User;

    const SECRET: &str = "blog-service-test-secret";

    struct Fixture {
        service: BlogService,
        users: Arc<dyn UserRepository>,
        tokens: TokenService,
    }

    async fn setup(ownership: OwnershipPolicy) -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let tokens = TokenService::with_secret(SECRET, None);
        let service = BlogService::with_ownership(
            SqlxBlogRepository::boxed(pool.clone()),
            tokens.clone(),
            ownership,
        );

        Fixture {
            service,
            users: SqlxUserRepository::boxed(pool),
            tokens,
        }
    }

    impl Fixture {
        /// Register a user and return a token bound to it
        async fn login_as(&self, username: &str) -> String {
            let mut user = User::new(username.to_string(), "Tester".to_string(), "hash".to_string());
            user.id = self.users.insert(&user).await.unwrap();
            self.tokens.issue(&user.identity()).unwrap()
        }
    }

    fn create_input(title: Option<&str>, url: Option<&str>, likes: Option<i64>) -> CreateBlogInput {
        CreateBlogInput {
            title: title.map(String::from),
            author: Some("Robert C. Martin".to_string()),
            url: url.map(String::from),
            likes,
        }
    }

    #[tokio::test]
    async fn test_create_blog_with_token() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;

        let blog = f
            .service
            .create(create_input(Some("Type wars"), Some("http://blog.cleancoder.com"), Some(2)), Some(&token))
            .await
            .unwrap();

        assert!(!blog.id.is_empty());
        assert_eq!(blog.likes, 2);
        let creator = f.tokens.verify(Some(&token)).unwrap().id;
        assert!(blog.is_created_by(&creator));

        let listed = f.service.list().await.unwrap();
        assert_eq!(listed, vec![blog]);
    }

    #[tokio::test]
    async fn test_create_defaults_likes_to_zero() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;

        let blog = f
            .service
            .create(create_input(Some("No likes"), Some("http://x.test"), None), Some(&token))
            .await
            .unwrap();

        assert_eq!(blog.likes, 0);
        assert_eq!(f.service.get(&blog.id).await.unwrap().likes, 0);
    }

    #[tokio::test]
    async fn test_create_without_token_inserts_nothing() {
        let f = setup(OwnershipPolicy::Strict).await;

        let result = f
            .service
            .create(create_input(Some("t"), Some("u"), Some(1)), None)
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, BlogServiceError::MissingToken));
        assert_eq!(err.to_string(), "token missing");
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_invalid_token() {
        let f = setup(OwnershipPolicy::Strict).await;

        let result = f
            .service
            .create(create_input(Some("t"), Some("u"), None), Some("garbage"))
            .await;

        assert!(matches!(result, Err(BlogServiceError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_create_without_title_and_url_inserts_nothing() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;

        let result = f
            .service
            .create(create_input(None, None, Some(35)), Some(&token))
            .await;

        assert!(matches!(result, Err(BlogServiceError::ValidationError(_))));
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_and_negative_likes() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;

        let blank = f
            .service
            .create(create_input(Some("   "), Some("u"), None), Some(&token))
            .await;
        let negative = f
            .service
            .create(create_input(Some("t"), Some("u"), Some(-1)), Some(&token))
            .await;

        assert!(matches!(blank, Err(BlogServiceError::ValidationError(_))));
        assert!(matches!(negative, Err(BlogServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_applies_supplied_fields_only() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;
        let blog = f
            .service
            .create(create_input(Some("Before"), Some("http://a.test"), Some(1)), Some(&token))
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                &blog.id,
                UpdateBlogInput {
                    likes: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.likes, 10);
        assert_eq!(updated.title, "Before");
        assert_eq!(updated.url, "http://a.test");
        assert_eq!(f.service.get(&blog.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_blog() {
        let f = setup(OwnershipPolicy::Strict).await;

        let result = f.service.update("missing", UpdateBlogInput::default()).await;

        assert!(matches!(result, Err(BlogServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_url() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;
        let blog = f
            .service
            .create(create_input(Some("t"), Some("http://a.test"), None), Some(&token))
            .await
            .unwrap();

        let result = f
            .service
            .update(
                &blog.id,
                UpdateBlogInput {
                    url: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(BlogServiceError::ValidationError(_))));
        assert_eq!(f.service.get(&blog.id).await.unwrap().url, "http://a.test");
    }

    #[tokio::test]
    async fn test_delete_by_creator() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;
        let keep = f
            .service
            .create(create_input(Some("keep"), Some("u"), None), Some(&token))
            .await
            .unwrap();
        let gone = f
            .service
            .create(create_input(Some("gone"), Some("u"), None), Some(&token))
            .await
            .unwrap();

        f.service.delete(&gone.id, Some(&token)).await.unwrap();

        assert_eq!(f.service.list().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn test_delete_requires_token() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;
        let blog = f
            .service
            .create(create_input(Some("t"), Some("u"), None), Some(&token))
            .await
            .unwrap();

        let result = f.service.delete(&blog.id, None).await;

        assert!(matches!(result, Err(BlogServiceError::MissingToken)));
        assert_eq!(f.service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_blog() {
        let f = setup(OwnershipPolicy::Strict).await;
        let token = f.login_as("root").await;

        let result = f.service.delete("missing", Some(&token)).await;

        assert!(matches!(result, Err(BlogServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_strict_policy_forbids_other_users() {
        let f = setup(OwnershipPolicy::Strict).await;
        let owner = f.login_as("owner").await;
        let other = f.login_as("other").await;
        let blog = f
            .service
            .create(create_input(Some("t"), Some("u"), None), Some(&owner))
            .await
            .unwrap();

        let result = f.service.delete(&blog.id, Some(&other)).await;

        assert!(matches!(result, Err(BlogServiceError::Forbidden)));
        assert!(f.service.get(&blog.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_token_only_policy_allows_other_users() {
        let f = setup(OwnershipPolicy::TokenOnly).await;
        let owner = f.login_as("owner").await;
        let other = f.login_as("other").await;
        let blog = f
            .service
            .create(create_input(Some("t"), Some("u"), None), Some(&owner))
            .await
            .unwrap();

        f.service.delete(&blog.id, Some(&other)).await.unwrap();

        assert!(matches!(
            f.service.get(&blog.id).await,
            Err(BlogServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_token_error_mapping() {
        assert!(matches!(
            BlogServiceError::from(TokenError::Missing),
            BlogServiceError::MissingToken
        ));
        assert!(matches!(
            BlogServiceError::from(TokenError::Invalid("expired".into())),
            BlogServiceError::InvalidToken
        ));
    }
}
