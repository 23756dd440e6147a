//! strategy dispatch and the recommendation endpoints
//!
//! ## strategies
//!
//! ### 1. content-based (exploitative)
//! - profile = mean feature vector of a user's purchases
//! - cosine similarity between profile and the target product
//! - **strength**: rewards users who already buy things like the target
//!
//! ### 2. collaborative filtering (explorative)
//! - the user's stored preference for the target product, unmodified
//! - **strength**: reaches users whose purchase history says little about the target
//!
//! ### 3. hybrid (balanced)
//! - proportional slices of both ranked lists, content first (see `scoring::blend`)
//! - rows carry their source instead of a score because the two scales don't compare
//! - a user can show up once per source
//!
//! every strategy ends in the promotion split (`bucket::promotion_strategy`), which is
//! skipped when nobody cleared the threshold.

use crate::bucket::{promotion_strategy, Buckets};
use crate::collaborative::CollaborativeScorer;
use crate::config::Config;
use crate::content::ContentScorer;
use crate::dataset::Dataset;
use crate::filter::ExcludePatternFilter;
use crate::providers::{validate_ratio, validate_threshold, ScoreError, Scorer};
use crate::scoring::{blend, BlendConfig, BlendedRecord, ScoreRecord};
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Strategy {
    #[serde(
        rename = "content",
        alias = "content-based",
        alias = "Exploitative (Content-Based)"
    )]
    ContentBased,
    #[serde(
        rename = "collaborative",
        alias = "collaborative-filtering",
        alias = "Explorative (Collaborative Filtering)"
    )]
    Collaborative,
    #[serde(rename = "hybrid", alias = "Balanced (Hybrid)")]
    Hybrid,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::ContentBased => "Exploitative (Content-Based)",
            Strategy::Collaborative => "Explorative (Collaborative Filtering)",
            Strategy::Hybrid => "Balanced (Hybrid)",
        }
    }

    /// heading shown above the result table
    pub fn title(&self, config: &BlendConfig) -> String {
        match self {
            Strategy::ContentBased => "Content-Based Results".to_string(),
            Strategy::Collaborative => "Collaborative Filtering Results".to_string(),
            Strategy::Hybrid => {
                let content = (config.content_ratio * 100.0).round() as i64;
                format!(
                    "Hybrid Results ({}% Content-Based + {}% CF)",
                    content,
                    100 - content
                )
            }
        }
    }
}

fn default_strategy() -> Strategy {
    Strategy::ContentBased
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub product: String,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    /// minimum similarity/preference; falls back to the configured default
    #[serde(default)]
    pub threshold: Option<f64>,
    /// share of the hybrid result drawn from content-based scoring
    #[serde(default)]
    pub content_ratio: Option<f64>,
    /// comma-separated regex patterns over user ids to leave out
    #[serde(default)]
    pub exclude: Option<String>,
}

/// ranked users: scored for the single strategies, source-tagged for hybrid
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Recommendations {
    Scored(Vec<ScoreRecord>),
    Blended(Vec<BlendedRecord>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Promotion {
    Scored(Buckets<ScoreRecord>),
    Blended(Buckets<BlendedRecord>),
}

impl Recommendations {
    pub fn len(&self) -> usize {
        match self {
            Recommendations::Scored(rows) => rows.len(),
            Recommendations::Blended(rows) => rows.len(),
        }
    }

    /// high/medium/low split, `None` when the result is empty
    pub fn promotion(&self) -> Option<Promotion> {
        match self {
            Recommendations::Scored(rows) => promotion_strategy(rows).map(Promotion::Scored),
            Recommendations::Blended(rows) => promotion_strategy(rows).map(Promotion::Blended),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub product: String,
    pub strategy: Strategy,
    pub title: String,
    pub results: Recommendations,
    pub promotion: Option<Promotion>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<String>,
}

impl ScoreError {
    fn into_actix_error(self) -> actix_web::Error {
        match &self {
            ScoreError::UnknownProduct(_) => actix_web::error::ErrorNotFound(self.to_string()),
            ScoreError::InvalidThreshold(_) | ScoreError::InvalidRatio(_) => {
                actix_web::error::ErrorBadRequest(self.to_string())
            }
        }
    }
}

/// blend the top of both rankings for a product
pub fn score_hybrid<C: Scorer, F: Scorer>(
    product: &str,
    threshold: f64,
    blend_config: &BlendConfig,
    exclude: &ExcludePatternFilter,
    content: &C,
    collaborative: &F,
) -> Result<Vec<BlendedRecord>, ScoreError> {
    validate_ratio(blend_config.content_ratio)?;
    let product_owned = product.to_string();

    let content_ranked = exclude.apply(content.score(product, threshold)?);
    let cf_ranked = exclude.apply(collaborative.score(product, threshold)?);

    let blended = blend(&content_ranked, &cf_ranked, blend_config);

    logfire::info!(
        "hybrid blend completed",
        product = &product_owned,
        content_candidates = content_ranked.len() as i64,
        cf_candidates = cf_ranked.len() as i64,
        content_ratio = blend_config.content_ratio,
        blended = blended.len() as i64
    );

    Ok(blended)
}

/// run one strategy against the given scorers
pub fn execute_strategy<C: Scorer, F: Scorer>(
    strategy: Strategy,
    product: &str,
    threshold: f64,
    blend_config: &BlendConfig,
    exclude: &ExcludePatternFilter,
    content: &C,
    collaborative: &F,
) -> Result<Recommendations, ScoreError> {
    validate_threshold(threshold)?;
    let product_owned = product.to_string();

    let single = |scorer: &dyn Scorer| -> Result<Recommendations, ScoreError> {
        let _span = logfire::span!(
            "scorer.rank",
            scorer = scorer.name(),
            product = &product_owned,
            threshold = threshold
        )
        .entered();

        let ranked = exclude.apply(scorer.score(product, threshold)?);
        logfire::info!(
            "scoring completed",
            scorer = scorer.name(),
            results_found = ranked.len() as i64,
            top_score = ranked.first().map(|r| r.score).unwrap_or(0.0)
        );
        Ok(Recommendations::Scored(ranked))
    };

    match strategy {
        Strategy::ContentBased => single(content),
        Strategy::Collaborative => single(collaborative),
        Strategy::Hybrid => score_hybrid(
            product,
            threshold,
            blend_config,
            exclude,
            content,
            collaborative,
        )
        .map(Recommendations::Blended),
    }
}

/// generate etag for caching; the dataset never changes while the process runs
fn generate_etag(query: &RecommendQuery, threshold: f64, content_ratio: f64) -> String {
    let mut hasher = DefaultHasher::new();
    query.product.hash(&mut hasher);
    query.strategy.hash(&mut hasher);
    threshold.to_bits().hash(&mut hasher);
    content_ratio.to_bits().hash(&mut hasher);
    query.exclude.hash(&mut hasher);
    format!("\"{}\"", hasher.finish())
}

/// shared implementation used by both POST and GET handlers
fn perform_recommendation(
    query: &RecommendQuery,
    threshold: f64,
    content_ratio: f64,
    dataset: &Dataset,
) -> ActixResult<RecommendResponse> {
    let exclude = query
        .exclude
        .as_deref()
        .map(ExcludePatternFilter::from_comma_separated)
        .unwrap_or_default();

    let _span = logfire::span!(
        "recommendation",
        product = &query.product,
        strategy = query.strategy.label(),
        threshold = threshold,
        content_ratio = content_ratio,
        exclude_patterns_count = exclude.pattern_count() as i64
    )
    .entered();

    logfire::info!(
        "recommendation request received",
        product = &query.product,
        strategy = query.strategy.label(),
        threshold = threshold,
        exclude_patterns = &exclude.patterns_str()
    );

    let blend_config = BlendConfig::new(content_ratio);
    let content = ContentScorer::new(&dataset.catalog, &dataset.purchases);
    let collaborative = CollaborativeScorer::new(&dataset.preferences);

    let results = execute_strategy(
        query.strategy,
        &query.product,
        threshold,
        &blend_config,
        &exclude,
        &content,
        &collaborative,
    )
    .map_err(|e| {
        logfire::warn!(
            "recommendation failed",
            product = &query.product,
            error = &e.to_string()
        );
        e.into_actix_error()
    })?;

    let promotion = results.promotion();

    logfire::info!(
        "recommendation completed",
        product = &query.product,
        strategy = query.strategy.label(),
        results_count = results.len() as i64,
        promoted = promotion.is_some()
    );

    Ok(RecommendResponse {
        product: query.product.clone(),
        strategy: query.strategy,
        title: query.strategy.title(&blend_config),
        results,
        promotion,
    })
}

/// POST /api/recommend
pub async fn recommend(
    query: web::Json<RecommendQuery>,
    config: web::Data<Config>,
    dataset: web::Data<Dataset>,
) -> ActixResult<HttpResponse> {
    let threshold = query.threshold.unwrap_or(config.default_threshold);
    let content_ratio = query.content_ratio.unwrap_or(config.default_content_ratio);

    let response = perform_recommendation(&query, threshold, content_ratio, &dataset)?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/recommend for shareable URLs
pub async fn recommend_get(
    query: web::Query<RecommendQuery>,
    config: web::Data<Config>,
    dataset: web::Data<Dataset>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    let threshold = query.threshold.unwrap_or(config.default_threshold);
    let content_ratio = query.content_ratio.unwrap_or(config.default_content_ratio);
    let etag = generate_etag(&query, threshold, content_ratio);

    if let Some(if_none_match) = req.headers().get("if-none-match") {
        if if_none_match.to_str().unwrap_or("") == etag {
            return Ok(HttpResponse::NotModified()
                .insert_header(("etag", etag))
                .finish());
        }
    }

    let response = perform_recommendation(&query, threshold, content_ratio, &dataset)?;

    Ok(HttpResponse::Ok()
        .insert_header(("etag", etag))
        .insert_header(("cache-control", "public, max-age=300"))
        .json(response))
}

/// GET /api/products
pub async fn products(dataset: web::Data<Dataset>) -> HttpResponse {
    HttpResponse::Ok().json(ProductsResponse {
        products: dataset.catalog.product_ids().map(str::to_string).collect(),
    })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/products", web::get().to(products))
        .route("/recommend", web::post().to(recommend))
        .route("/recommend", web::get().to(recommend_get));
}
