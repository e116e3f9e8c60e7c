//! End-to-end demo: record a competitor selection pipeline and ship
//! it to a local Traceboard backend.
//!
//! Run the backend first, then:
//!
//! ```sh
//! cargo run --package traceboard-sdk --example competitor_selection
//! ```
//!
//! Step updates stream live while the pipeline runs; the full trace
//! lands at the end and a JSON copy is written under `traces/`.

use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use traceboard_sdk::{BackendClient, JsonFileStorage, StepStatus, TraceRecorder};

struct Candidate {
    asin: &'static str,
    title: &'static str,
    price: f64,
    rating: f64,
    reviews: u32,
}

const REFERENCE_PRICE: f64 = 24.99;

fn mock_candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            asin: "B0AAAA01",
            title: "ErgoGlide Wireless Mouse",
            price: 19.99,
            rating: 4.5,
            reviews: 1287,
        },
        Candidate {
            asin: "B0BBBB02",
            title: "ClickPro Silent Mouse",
            price: 55.00,
            rating: 4.7,
            reviews: 932,
        },
        Candidate {
            asin: "B0CCCC03",
            title: "BudgetTrack Optical Mouse",
            price: 22.49,
            rating: 3.8,
            reviews: 2104,
        },
        Candidate {
            asin: "B0DDDD04",
            title: "GlideMax Travel Mouse",
            price: 27.90,
            rating: 4.3,
            reviews: 418,
        },
    ]
}

fn mock_keywords(product_title: &str) -> Vec<String> {
    let mut keywords: Vec<String> = product_title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| w.len() > 3)
        .collect();
    keywords.dedup();
    keywords
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let product_title = "Wireless Ergonomic Mouse with USB Receiver";
    let mut metadata = serde_json::Map::new();
    metadata.insert("pipeline".to_string(), json!("competitor_selection"));
    metadata.insert("marketplace".to_string(), json!("US"));

    let mut trail = TraceRecorder::start_with_metadata("Competitor Selection", metadata);
    let client = BackendClient::from_env()?;
    info!(trace_id = %trail.trace_id(), backend = %client.base_url(), "pipeline starting");

    // Step 1: derive search keywords from the product title.
    {
        let mut step = trail.step("keyword_generation", "llm_call");
        step.log_input(json!({
            "product_title": product_title,
            "category": "Computer Accessories",
        }));
        let keywords = mock_keywords(product_title);
        step.log_output(json!({ "keywords": keywords, "source": "heuristic" }));
        step.set_reasoning("Tokenized the title and kept the distinctive terms");
    }
    if let Some(step) = trail.last_step() {
        client.spawn_send_step(trail.trace_id(), step.clone());
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Step 2: search the marketplace for candidates.
    let candidates = {
        let mut step = trail.step("candidate_search", "api_call");
        step.log_input(json!({ "marketplace": "US", "max_results": 10 }));
        let candidates = mock_candidates();
        let asins: Vec<&str> = candidates.iter().map(|c| c.asin).collect();
        step.log_output(json!({
            "candidates_found": candidates.len(),
            "asins": asins,
        }));
        candidates
    };
    if let Some(step) = trail.last_step() {
        client.spawn_send_step(trail.trace_id(), step.clone());
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Step 3: filter candidates and pick the strongest competitor.
    let price_min = REFERENCE_PRICE * 0.6;
    let price_max = REFERENCE_PRICE * 1.4;
    let min_rating = 4.0;
    let min_reviews = 500;

    let selected = {
        let mut step = trail.step("apply_filters", "logic");
        step.log_input(json!({
            "price_min": price_min,
            "price_max": price_max,
            "min_rating": min_rating,
            "min_reviews": min_reviews,
        }));

        let mut qualified: Vec<&Candidate> = Vec::new();
        for candidate in &candidates {
            let price_ok = candidate.price >= price_min && candidate.price <= price_max;
            let rating_ok = candidate.rating >= min_rating;
            let reviews_ok = candidate.reviews >= min_reviews;

            let eval = step.evaluation(candidate.asin, candidate.title);
            eval.check(
                "price_range",
                price_ok,
                format!("${:.2} against ${price_min:.2}-${price_max:.2}", candidate.price),
            )
            .check(
                "min_rating",
                rating_ok,
                format!("{:.1} against minimum {min_rating:.1}", candidate.rating),
            )
            .check(
                "min_reviews",
                reviews_ok,
                format!("{} against minimum {min_reviews}", candidate.reviews),
            )
            .set_status(if price_ok && rating_ok && reviews_ok {
                "QUALIFIED"
            } else {
                "REJECTED"
            });

            if price_ok && rating_ok && reviews_ok {
                qualified.push(candidate);
            }
        }

        let selected = qualified.iter().max_by_key(|c| c.reviews).copied();
        match selected {
            Some(best) => {
                step.log_output(json!({
                    "qualified": qualified.len(),
                    "selected": best.asin,
                }));
                step.set_reasoning("Picked the qualified candidate with the most reviews");
            }
            None => {
                step.log_output(json!({ "qualified": 0 }));
                step.set_reasoning("No candidate passed every filter");
                step.set_status(StepStatus::Warning);
            }
        }
        selected
    };
    if let Some(step) = trail.last_step() {
        client.spawn_send_step(trail.trace_id(), step.clone());
    }

    match selected {
        Some(best) => trail.complete(json!({
            "selected_competitor": {
                "asin": best.asin,
                "title": best.title,
                "price": best.price,
                "rating": best.rating,
                "reviews": best.reviews,
            }
        })),
        None => trail.complete(json!({ "selected_competitor": null })),
    }

    // Final delivery is synchronous so the finished trace always wins
    // over the fire-and-forget step updates above.
    let export = trail.export();
    match client.send_trace(&export).await {
        Ok(()) => info!(trace_id = %export.trace_id, "trace delivered"),
        Err(e) => warn!(error = %e, "backend unreachable, keeping local copy only"),
    }

    let storage = JsonFileStorage::new("traces");
    let path = storage.save_trace(&export)?;
    info!(path = %path.display(), "trace exported");

    Ok(())
}
