//! Blog article management.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use jc_closet_client::ApiError;
use jc_closet_client::models::{Article, ArticleInput};
use jc_closet_core::ArticleId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUserView;
use crate::models::views::date;
use crate::state::AppState;

/// One row of the articles table.
#[derive(Debug, Clone)]
pub struct ArticleRow {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub tags: String,
    pub published: bool,
    pub published_at: String,
}

impl From<&Article> for ArticleRow {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.to_string(),
            title: article.title.clone(),
            slug: article.slug.clone(),
            author: article.author.clone().unwrap_or_default(),
            tags: article.tags.join(", "),
            published: article.published,
            published_at: date(article.published_at),
        }
    }
}

#[derive(Template)]
#[template(path = "articles/index.html")]
pub struct ArticlesTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub articles: Vec<ArticleRow>,
    pub saved: bool,
    pub error: Option<String>,
}

/// Article editor form. Tags are comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub published: Option<String>,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ArticleForm {
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published.is_some()
    }

    /// Build the backend payload. A blank slug is derived from the title.
    ///
    /// # Errors
    ///
    /// Returns a message when the title or body is missing, or when no slug
    /// can be derived.
    pub fn to_input(&self) -> std::result::Result<ArticleInput, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required.".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("Content is required.".to_string());
        }

        let slug = match self.slug.trim() {
            "" => ArticleInput::slugify(title),
            given => ArticleInput::slugify(given),
        };
        if slug.is_empty() {
            return Err("Enter a slug using letters or numbers.".to_string());
        }

        let tags = self
            .tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ArticleInput {
            title: title.to_string(),
            slug,
            excerpt: optional(&self.excerpt),
            content: self.content.clone(),
            cover_image: optional(&self.cover_image),
            tags,
            published: self.is_published(),
        })
    }
}

impl From<&Article> for ArticleForm {
    fn from(article: &Article) -> Self {
        let input = ArticleInput::from(article);
        Self {
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt.unwrap_or_default(),
            content: input.content,
            cover_image: input.cover_image.unwrap_or_default(),
            tags: input.tags.join(", "),
            published: input.published.then(|| "on".to_string()),
        }
    }
}

#[derive(Template)]
#[template(path = "articles/form.html")]
pub struct ArticleFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    /// `None` when creating.
    pub article_id: Option<String>,
    pub action: String,
    pub form: ArticleForm,
    pub published: bool,
    pub error: Option<String>,
}

impl ArticleFormTemplate {
    fn new(
        admin_user: AdminUserView,
        article_id: Option<String>,
        form: ArticleForm,
        error: Option<String>,
    ) -> Self {
        let action = article_id
            .as_ref()
            .map_or_else(|| "/articles/new".to_string(), |id| format!("/articles/{id}/edit"));
        Self {
            admin_user,
            current_path: "/articles".to_string(),
            article_id,
            action,
            published: form.is_published(),
            form,
            error,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub saved: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(index))
        .route("/articles/new", get(new_form).post(create))
        .route("/articles/{id}/edit", get(edit_form).post(update))
        .route("/articles/{id}/delete", post(delete))
}

/// GET /articles
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Response {
    let (articles, error) = match state.admin_api(&session, &admin).admin_list_articles().await {
        Ok(articles) => (articles.iter().map(ArticleRow::from).collect(), None),
        Err(e) => {
            tracing::error!("Failed to fetch articles: {e}");
            (Vec::new(), Some("Articles could not be loaded.".to_string()))
        }
    };

    super::render(&ArticlesTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/articles".to_string(),
        articles,
        saved: query.saved.is_some(),
        error,
    })
}

/// GET /articles/new
pub async fn new_form(RequireAdminAuth(admin): RequireAdminAuth, session: Session) -> Response {
    let admin_user = super::admin_view(&session, &admin).await;
    super::render(&ArticleFormTemplate::new(
        admin_user,
        None,
        ArticleForm::default(),
        None,
    ))
}

/// GET /articles/{id}/edit
#[instrument(skip(admin, state, session))]
pub async fn edit_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let article = state
        .admin_api(&session, &admin)
        .admin_get_article(&ArticleId::new(id))
        .await?;

    let admin_user = super::admin_view(&session, &admin).await;
    Ok(super::render(&ArticleFormTemplate::new(
        admin_user,
        Some(article.id.to_string()),
        ArticleForm::from(&article),
        None,
    )))
}

/// Re-render the editor with a message.
async fn rejected(
    session: &Session,
    admin: &crate::models::CurrentAdmin,
    article_id: Option<String>,
    form: ArticleForm,
    message: String,
) -> Response {
    let admin_user = super::admin_view(session, admin).await;
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        super::render(&ArticleFormTemplate::new(
            admin_user,
            article_id,
            form,
            Some(message),
        )),
    )
        .into_response()
}

/// POST /articles/new
#[instrument(skip(admin, state, session, form))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ArticleForm>,
) -> Result<Response> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => return Ok(rejected(&session, &admin, None, form, message).await),
    };

    match state
        .admin_api(&session, &admin)
        .admin_create_article(&input)
        .await
    {
        Ok(article) => {
            tracing::info!(article_id = %article.id, slug = %article.slug, "Article created");
            Ok(Redirect::to("/articles?saved=1").into_response())
        }
        Err(ApiError::Validation(message)) => {
            Ok(rejected(&session, &admin, None, form, message).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /articles/{id}/edit
#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ArticleForm>,
) -> Result<Response> {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => return Ok(rejected(&session, &admin, Some(id), form, message).await),
    };

    let article_id = ArticleId::new(id);
    match state
        .admin_api(&session, &admin)
        .admin_update_article(&article_id, &input)
        .await
    {
        Ok(_) => {
            tracing::info!(article_id = %article_id, "Article updated");
            Ok(Redirect::to("/articles?saved=1").into_response())
        }
        Err(ApiError::Validation(message)) => {
            Ok(rejected(&session, &admin, Some(article_id.to_string()), form, message).await)
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /articles/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let article_id = ArticleId::new(id);
    state
        .admin_api(&session, &admin)
        .admin_delete_article(&article_id)
        .await?;

    tracing::info!(article_id = %article_id, "Article deleted");
    Ok(Redirect::to("/articles?saved=1"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ArticleForm {
        ArticleForm {
            title: "Choosing an Oud".to_string(),
            content: "Start with the base notes.".to_string(),
            tags: " oud, guides , ,niche".to_string(),
            ..ArticleForm::default()
        }
    }

    #[test]
    fn test_blank_slug_comes_from_title() {
        let input = form().to_input().unwrap();
        assert_eq!(input.slug, "choosing-an-oud");
        assert_eq!(input.tags, vec!["oud", "guides", "niche"]);
        assert!(!input.published);
        assert_eq!(input.excerpt, None);
    }

    #[test]
    fn test_given_slug_is_normalised() {
        let mut custom = form();
        custom.slug = "My Oud Guide".to_string();
        custom.published = Some("on".to_string());
        let input = custom.to_input().unwrap();
        assert_eq!(input.slug, "my-oud-guide");
        assert!(input.published);
    }

    #[test]
    fn test_rejects_unusable_articles() {
        let mut untitled = form();
        untitled.title = "   ".to_string();
        assert_eq!(untitled.to_input().unwrap_err(), "Title is required.");

        let mut symbols = form();
        symbols.title = "???".to_string();
        assert!(symbols.to_input().is_err());

        let mut empty = form();
        empty.content = "\n".to_string();
        assert!(empty.to_input().is_err());
    }
}
