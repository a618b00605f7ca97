//! Product listing and the promotion editor.
//!
//! Promotion times are entered and shown in UTC.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use jc_closet_client::ApiError;
use jc_closet_client::models::{Page, Perfume, ProductQuery, ProductSort};
use jc_closet_core::{ProductId, PromoTerms, PromoType};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{PAGE_SIZE, non_empty};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUserView;
use crate::models::views::{PageLinks, ProductRow};
use crate::state::AppState;

/// `<input type="datetime-local">` value format.
const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub page: Option<u32>,
    pub q: Option<String>,
}

#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub products: Vec<ProductRow>,
    pub q: String,
    pub links: PageLinks,
    pub error: Option<String>,
}

/// Promotion form, kept as strings so it can be re-rendered as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoForm {
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub promo_enabled: Option<String>,
    #[serde(default)]
    pub promo_type: String,
    #[serde(default)]
    pub promo_value: String,
    #[serde(default)]
    pub promo_start: String,
    #[serde(default)]
    pub promo_end: String,
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_LOCAL)
        .ok()
        .map(|naive| naive.and_utc())
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format(DATETIME_LOCAL).to_string())
        .unwrap_or_default()
}

impl PromoForm {
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.promo_enabled.is_some()
    }

    /// Validate into terms the backend will accept.
    ///
    /// A disabled promotion keeps whatever fields parse, so switching it
    /// back on later doesn't lose the window.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first problem with an enabled promotion.
    pub fn to_terms(&self) -> std::result::Result<PromoTerms, String> {
        let promo_type = match self.promo_type.trim() {
            "discount" => Some(PromoType::Discount),
            "price" => Some(PromoType::Price),
            _ => None,
        };
        let promo_value = self.promo_value.trim().parse::<Decimal>().ok();
        let promo_start = parse_time(&self.promo_start);
        let promo_end = parse_time(&self.promo_end);

        let terms = PromoTerms {
            promo_enabled: self.enabled(),
            promo_type,
            promo_value,
            promo_start,
            promo_end,
        };
        if !terms.promo_enabled {
            return Ok(terms);
        }

        let kind = promo_type.ok_or("Choose a promotion type.")?;
        let value = promo_value
            .filter(|v| v.is_sign_positive() && !v.is_zero())
            .ok_or("Enter a value greater than zero.")?;
        if kind == PromoType::Discount && value > Decimal::ONE_HUNDRED {
            return Err("A discount can't be more than 100%.".to_string());
        }
        let (Some(start), Some(end)) = (promo_start, promo_end) else {
            return Err("Set both a start and an end time.".to_string());
        };
        if start >= end {
            return Err("The promotion must end after it starts.".to_string());
        }

        Ok(terms)
    }
}

impl From<&PromoTerms> for PromoForm {
    fn from(terms: &PromoTerms) -> Self {
        Self {
            promo_enabled: terms.promo_enabled.then(|| "on".to_string()),
            promo_type: match terms.promo_type {
                Some(PromoType::Discount) => "discount".to_string(),
                Some(PromoType::Price) => "price".to_string(),
                Some(PromoType::Other) | None => String::new(),
            },
            promo_value: terms.promo_value.map(|v| v.to_string()).unwrap_or_default(),
            promo_start: format_time(terms.promo_start),
            promo_end: format_time(terms.promo_end),
        }
    }
}

/// Promotion type `<option>`.
#[derive(Debug, Clone)]
pub struct TypeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn type_options(current: &str) -> Vec<TypeOption> {
    [("discount", "Percentage discount"), ("price", "Fixed promo price")]
        .into_iter()
        .map(|(value, label)| TypeOption {
            value,
            label,
            selected: value == current,
        })
        .collect()
}

#[derive(Template)]
#[template(path = "products/promo.html")]
pub struct PromoTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub product: ProductRow,
    pub form: PromoForm,
    pub enabled: bool,
    pub types: Vec<TypeOption>,
    pub error: Option<String>,
    pub saved: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PromoPageQuery {
    pub saved: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index))
        .route("/products/{id}/promo", get(promo_form).post(save_promo))
}

/// GET /products
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductsQuery>,
) -> Response {
    let api_query = ProductQuery {
        page: query.page.filter(|p| *p > 1),
        limit: Some(PAGE_SIZE),
        sort: Some(ProductSort::Name),
        search: non_empty(query.q.as_ref()),
        ..ProductQuery::default()
    };

    let (page, error) = match state
        .admin_api(&session, &admin)
        .list_perfumes(&api_query)
        .await
    {
        Ok(page) => (page, None),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            (
                Page::default(),
                Some("Products could not be loaded.".to_string()),
            )
        }
    };

    let now = Utc::now();
    let currency = state.config().currency;
    let q = api_query.search.unwrap_or_default();

    super::render(&ProductsTemplate {
        admin_user: super::admin_view(&session, &admin).await,
        current_path: "/products".to_string(),
        products: page
            .items
            .iter()
            .map(|p| ProductRow::new(p, now, currency))
            .collect(),
        links: PageLinks::new(&page, "/products", &[("q", &q)]),
        q,
        error,
    })
}

fn promo_page(
    state: &AppState,
    admin_user: AdminUserView,
    perfume: &Perfume,
    form: PromoForm,
    error: Option<String>,
    saved: bool,
) -> PromoTemplate {
    PromoTemplate {
        admin_user,
        current_path: "/products".to_string(),
        product: ProductRow::new(perfume, Utc::now(), state.config().currency),
        enabled: form.enabled(),
        types: type_options(form.promo_type.trim()),
        form,
        error,
        saved,
    }
}

/// GET /products/{id}/promo
#[instrument(skip(admin, state, session))]
pub async fn promo_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<PromoPageQuery>,
) -> Result<Response> {
    let perfume = state
        .admin_api(&session, &admin)
        .get_perfume(&ProductId::new(id))
        .await?;

    let admin_user = super::admin_view(&session, &admin).await;
    let form = PromoForm::from(&perfume.promo);
    let page = promo_page(
        &state,
        admin_user,
        &perfume,
        form,
        None,
        query.saved.is_some(),
    );
    Ok(super::render(&page))
}

/// POST /products/{id}/promo
#[instrument(skip(admin, state, session, form))]
pub async fn save_promo(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<PromoForm>,
) -> Result<Response> {
    let product_id = ProductId::new(id);
    let api = state.admin_api(&session, &admin);

    let rejection = match form.to_terms() {
        Ok(terms) => match api.admin_update_promo(&product_id, &terms).await {
            Ok(_) => {
                tracing::info!(
                    product_id = %product_id,
                    enabled = terms.promo_enabled,
                    "Promotion saved"
                );
                return Ok(
                    Redirect::to(&format!("/products/{product_id}/promo?saved=1")).into_response(),
                );
            }
            Err(ApiError::Validation(message)) => message,
            Err(e) => return Err(e.into()),
        },
        Err(message) => message,
    };

    let perfume = api.get_perfume(&product_id).await?;
    let admin_user = super::admin_view(&session, &admin).await;
    let page = promo_page(&state, admin_user, &perfume, form, Some(rejection), false);
    Ok((StatusCode::UNPROCESSABLE_ENTITY, super::render(&page)).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn form() -> PromoForm {
        PromoForm {
            promo_enabled: Some("on".to_string()),
            promo_type: "discount".to_string(),
            promo_value: "20".to_string(),
            promo_start: "2026-11-01T00:00".to_string(),
            promo_end: "2026-11-30T23:59".to_string(),
        }
    }

    #[test]
    fn test_valid_form_becomes_terms() {
        let terms = form().to_terms().unwrap();
        assert!(terms.promo_enabled);
        assert_eq!(terms.promo_type, Some(PromoType::Discount));
        assert_eq!(terms.promo_value, Some(Decimal::from(20)));
        assert_eq!(
            terms.promo_start,
            Some(Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_enabled_promotions_are_validated() {
        let mut too_big = form();
        too_big.promo_value = "120".to_string();
        assert!(too_big.to_terms().is_err());

        let mut backwards = form();
        backwards.promo_end = "2026-10-01T00:00".to_string();
        assert_eq!(
            backwards.to_terms().unwrap_err(),
            "The promotion must end after it starts."
        );

        let mut no_window = form();
        no_window.promo_start = String::new();
        assert!(no_window.to_terms().is_err());

        let mut fixed = form();
        fixed.promo_type = "price".to_string();
        fixed.promo_value = "9999".to_string();
        assert!(fixed.to_terms().is_ok());
    }

    #[test]
    fn test_disabled_promotion_skips_validation() {
        let mut off = form();
        off.promo_enabled = None;
        off.promo_value = "abc".to_string();
        let terms = off.to_terms().unwrap();
        assert!(!terms.promo_enabled);
        assert_eq!(terms.promo_value, None);
        assert!(terms.promo_start.is_some());
    }

    #[test]
    fn test_form_round_trips_saved_terms() {
        let terms = form().to_terms().unwrap();
        let again = PromoForm::from(&terms);
        assert_eq!(again.promo_start, "2026-11-01T00:00");
        assert_eq!(again.promo_type, "discount");
        assert!(again.enabled());
    }
}
