//! Transport-neutral request routing for the matching endpoints
//!
//! - `GET  /plans?maxBudget=<amount>`
//! - `POST /match`
//! - `POST /match/report`
//! - `GET  /premium?planId=<id>&age=<n>`
//! - `POST /premium/adjust`
//!
//! The Lambda handler binary adapts HTTP events onto [`MatchService::route`].

use crate::error::EngineError;
use crate::matching::{listing_label, premium_span, MatchEngine, PremiumSpan, UserQuery};
use crate::plan::{CatalogSnapshot, InsurancePlan, OptionalCover};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Status code and JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(e) => Self::error(500, &format!("failed to encode response: {}", e)),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

impl From<EngineError> for ApiResponse {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownPlan(_) => ApiResponse::error(404, &err.to_string()),
            EngineError::CandidateLimitExceeded { .. } => ApiResponse::error(413, &err.to_string()),
        }
    }
}

/// `POST /match` body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(flatten)]
    pub query: UserQuery,
    /// Keep only the top N results
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `POST /premium/adjust` body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    pub plan_id: String,
    #[serde(default, deserialize_with = "crate::matching::lenient_covers")]
    pub selected_covers: BTreeSet<OptionalCover>,
    /// Applicant age used to resolve the base premium
    #[serde(default, deserialize_with = "crate::matching::lenient_age")]
    pub age: Option<u8>,
}

/// Plan row returned by `GET /plans`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanListing<'a> {
    #[serde(flatten)]
    pub plan: &'a InsurancePlan,
    pub company_name: &'a str,
    pub premium_label: String,
    pub premium_span: Option<PremiumSpan>,
}

/// Shared state behind every request
#[derive(Debug, Clone)]
pub struct MatchService {
    catalog: Arc<CatalogSnapshot>,
    engine: MatchEngine,
    /// Fixed perturbation seed; `None` draws fresh entropy per request
    seed: Option<u64>,
}

impl MatchService {
    pub fn new(catalog: Arc<CatalogSnapshot>, engine: MatchEngine, seed: Option<u64>) -> Self {
        Self {
            catalog,
            engine,
            seed,
        }
    }

    fn jitter(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Dispatch one request
    pub fn route(
        &self,
        method: &str,
        path: &str,
        params: &HashMap<String, String>,
        body: Option<&str>,
    ) -> ApiResponse {
        let path = path.trim_end_matches('/');
        log::debug!("{} {}", method, path);

        match (method.to_ascii_uppercase().as_str(), path) {
            ("OPTIONS", _) => ApiResponse::empty(204),
            ("GET", "/plans") => self.list_plans(params),
            ("POST", "/match") => self.match_plans(body, false),
            ("POST", "/match/report") => self.match_plans(body, true),
            ("GET", "/premium") => self.premium(params),
            ("POST", "/premium/adjust") => self.adjust(body),
            (method, path) => ApiResponse::error(404, &format!("no route for {} {}", method, path)),
        }
    }

    fn list_plans(&self, params: &HashMap<String, String>) -> ApiResponse {
        let plans: Vec<&InsurancePlan> = match params.get("maxBudget") {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(max) if max.is_finite() => self.engine.plans_within(&self.catalog, max),
                _ => return ApiResponse::error(400, &format!("invalid maxBudget: {:?}", raw)),
            },
            None => self.catalog.plans().iter().collect(),
        };

        let listings: Vec<PlanListing<'_>> = plans
            .into_iter()
            .map(|plan| PlanListing {
                plan,
                company_name: self.catalog.company_name(plan),
                premium_label: listing_label(plan),
                premium_span: premium_span(plan),
            })
            .collect();

        ApiResponse::json(200, &listings)
    }

    fn match_plans(&self, body: Option<&str>, full_report: bool) -> ApiResponse {
        let request: MatchRequest = match serde_json::from_str(body.unwrap_or("{}")) {
            Ok(r) => r,
            Err(e) => return ApiResponse::error(400, &format!("Invalid JSON: {}", e)),
        };

        let mut config = self.engine.config().clone();
        if request.limit.is_some() {
            config.limit = request.limit;
        }
        let engine = MatchEngine::new(self.engine.tables().clone(), config);
        let mut jitter = self.jitter();

        if full_report {
            match engine.report(&self.catalog, &request.query, &mut jitter) {
                Ok(report) => ApiResponse::json(200, &report),
                Err(e) => e.into(),
            }
        } else {
            match engine.rank_plans(&self.catalog, &request.query, &mut jitter) {
                Ok(results) => ApiResponse::json(200, &results),
                Err(e) => e.into(),
            }
        }
    }

    fn premium(&self, params: &HashMap<String, String>) -> ApiResponse {
        let Some(plan_id) = params.get("planId") else {
            return ApiResponse::error(400, "missing planId");
        };
        let age = match params.get("age").map(|raw| raw.trim().parse::<u8>()) {
            Some(Ok(age)) => age,
            Some(Err(_)) => return ApiResponse::error(400, "age must be a whole number between 0 and 255"),
            None => return ApiResponse::error(400, "missing age"),
        };

        match self.engine.premium(&self.catalog, plan_id, age) {
            Ok(premium) => ApiResponse::json(200, &premium),
            Err(e) => e.into(),
        }
    }

    fn adjust(&self, body: Option<&str>) -> ApiResponse {
        let request: AdjustRequest = match serde_json::from_str(body.unwrap_or("")) {
            Ok(r) => r,
            Err(e) => return ApiResponse::error(400, &format!("Invalid JSON: {}", e)),
        };

        match self
            .engine
            .adjust(&self.catalog, &request.plan_id, request.age, &request.selected_covers)
        {
            Ok(Some(adjusted)) => ApiResponse::json(200, &adjusted),
            Ok(None) => ApiResponse::json(200, &serde_json::json!({ "unpriceable": true })),
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{AgeRangeTable, CoverOption};
    use serde_json::Value;

    fn service() -> MatchService {
        let senior = AgeRangeTable::from_map([("65-69", 57952.0), ("70-74", 68819.0)]).unwrap();
        let mut gold = InsurancePlan::fixed("gold", "acme", "Gold", 48000.0).with_room_rate("Private Room");
        gold.dental = CoverOption { offered: true, in_base: true, premium: 30000.0, limit: None };
        gold.optical = CoverOption { offered: true, in_base: false, premium: 3500.0, limit: None };

        let catalog = CatalogSnapshot::from_plans(vec![
            gold,
            InsurancePlan::age_based("senior", "jubilee", "Silver", senior),
            InsurancePlan::fixed("royal", "zenith", "Royal", 300000.0),
        ]);
        MatchService::new(Arc::new(catalog), MatchEngine::default(), Some(3))
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn body(response: &ApiResponse) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[test]
    fn test_list_plans_with_budget() {
        let svc = service();
        let response = svc.route("GET", "/plans", &params(&[("maxBudget", "60000")]), None);
        assert_eq!(response.status, 200);
        let plans = body(&response);
        let ids: Vec<&str> = plans.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["gold", "senior"]);
        assert_eq!(plans[1]["premiumLabel"], "Age-based");

        let all = svc.route("GET", "/plans", &HashMap::new(), None);
        assert_eq!(body(&all).as_array().unwrap().len(), 3);

        let bad = svc.route("GET", "/plans", &params(&[("maxBudget", "cheap")]), None);
        assert_eq!(bad.status, 400);
    }

    #[test]
    fn test_match_endpoint() {
        let svc = service();
        let request = r#"{"desiredCoverage": "enhanced", "budget": "40k-60k", "age": 30,
                          "roomType": "private", "optionalCovers": [], "limit": 2}"#;
        let response = svc.route("POST", "/match", &HashMap::new(), Some(request));
        assert_eq!(response.status, 200);

        let results = body(&response);
        let results = results.as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["planId"], "gold");
        assert_eq!(results[0]["rank"], 1);
        assert_eq!(results[1]["rank"], 2);

        // Same seed, same answer
        let again = svc.route("POST", "/match", &HashMap::new(), Some(request));
        assert_eq!(again.body, response.body);
    }

    #[test]
    fn test_match_report_endpoint() {
        let svc = service();
        let response = svc.route("POST", "/match/report", &HashMap::new(), Some(r#"{"age": 68}"#));
        assert_eq!(response.status, 200);
        let report = body(&response);
        assert_eq!(report["resultCount"], 3);
        assert!(report["generatedAt"].is_string());
    }

    #[test]
    fn test_match_labels_ignore_case() {
        let svc = service();
        let lower = r#"{"desiredCoverage": "enhanced", "budget": "40k-60k", "roomType": "private"}"#;
        let capitalized = r#"{"desiredCoverage": "Enhanced", "budget": "40K-60K", "roomType": "Private"}"#;

        let expected = svc.route("POST", "/match", &HashMap::new(), Some(lower));
        let response = svc.route("POST", "/match", &HashMap::new(), Some(capitalized));
        assert_eq!(response.status, 200);
        assert_eq!(response.body, expected.body);

        let results = body(&response);
        assert_eq!(results[0]["planId"], "gold");
        assert_eq!(results[0]["breakdown"]["coverage"], 0.4);
        assert_eq!(results[0]["breakdown"]["room"], 0.2);
    }

    #[test]
    fn test_match_tolerates_mistyped_fields() {
        let svc = service();
        for request in [
            r#"{"desiredCoverage": null}"#,
            r#"{"roomType": null}"#,
            r#"{"optionalCovers": null}"#,
            r#"{"budget": 50000}"#,
            r#"{"age": "68"}"#,
            r#"{"age": "old", "ageRange": 65}"#,
        ] {
            let response = svc.route("POST", "/match", &HashMap::new(), Some(request));
            assert_eq!(response.status, 200, "{} -> {}", request, response.body);
            assert_eq!(body(&response).as_array().unwrap().len(), 3, "{}", request);
        }
    }

    #[test]
    fn test_adjust_accepts_string_age() {
        let response = service().route(
            "POST",
            "/premium/adjust",
            &HashMap::new(),
            Some(r#"{"planId": "senior", "age": "68", "selectedCovers": null}"#),
        );
        assert_eq!(response.status, 200);
        assert_eq!(body(&response)["totalPremium"], 57952.0);
    }

    #[test]
    fn test_match_bad_json() {
        let response = service().route("POST", "/match", &HashMap::new(), Some("{oops"));
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_premium_endpoint() {
        let svc = service();
        let priced = svc.route("GET", "/premium", &params(&[("planId", "senior"), ("age", "68")]), None);
        assert_eq!(body(&priced), serde_json::json!({"premium": 57952.0}));

        let unpriced = svc.route("GET", "/premium", &params(&[("planId", "senior"), ("age", "80")]), None);
        assert_eq!(body(&unpriced), serde_json::json!({"unpriceable": true}));

        let missing = svc.route("GET", "/premium", &params(&[("planId", "nope"), ("age", "30")]), None);
        assert_eq!(missing.status, 404);

        let bad_age = svc.route("GET", "/premium", &params(&[("planId", "senior"), ("age", "old")]), None);
        assert_eq!(bad_age.status, 400);
    }

    #[test]
    fn test_adjust_endpoint() {
        let svc = service();
        let response = svc.route(
            "POST",
            "/premium/adjust",
            &HashMap::new(),
            Some(r#"{"planId": "gold", "selectedCovers": ["dental", "optical", "maternity"]}"#),
        );
        assert_eq!(response.status, 200);
        assert_eq!(body(&response)["totalPremium"], 51500.0);

        let unpriced = svc.route(
            "POST",
            "/premium/adjust",
            &HashMap::new(),
            Some(r#"{"planId": "senior", "age": 90, "selectedCovers": []}"#),
        );
        assert_eq!(body(&unpriced), serde_json::json!({"unpriceable": true}));
    }

    #[test]
    fn test_unknown_route_and_preflight() {
        let svc = service();
        assert_eq!(svc.route("DELETE", "/plans", &HashMap::new(), None).status, 404);
        assert_eq!(svc.route("OPTIONS", "/match", &HashMap::new(), None).status, 204);
    }
}
