//! End-to-end tests against a running site.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database with the bundled sample data
//! - The web server running (cargo run -p washboard-web)
//!
//! Run with: cargo test -p washboard-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{StatusCode, header};
use serde_json::Value;

use washboard_integration_tests::{base_url, log_in, session_client};

fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Review ids in page order, read from the `data-review-id` attributes.
fn review_ids(html: &str) -> Vec<String> {
    html.split("data-review-id=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_homepage_lists_sample_shops() {
    let body = session_client()
        .get(format!("{}/homepage", base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Weclean Laundry Shop"));
    assert!(body.contains(r#"href="/NonstopLaundryShopMalate""#));
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_shop_page_renders_reviews_and_stars() {
    let resp = session_client()
        .get(format!("{}/Weclean", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.unwrap();
    assert!(body.contains("Fast and fragrant"));
    assert!(body.contains(r#"class="starsImg""#));
    assert!(body.contains(r#"data-reaction="none""#));
    // The long sample comment is split for "Show more..."
    assert!(body.contains(r#"<span class="hide more">"#));
    // Reviews of other shops never leak in
    assert!(!body.contains("Lifesaver at 2 AM"));
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_unknown_shop_is_not_found() {
    let resp = session_client()
        .get(format!("{}/NoSuchLaundry", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_profile_without_document_renders_placeholder() {
    let resp = session_client()
        .get(format!("{}/view_other_profile_paolo", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.unwrap();
    assert!(body.contains("hasn't set up a profile yet"));
    assert!(body.contains("Missing sock"));
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_owner_page_lists_shop_reviews_and_replies() {
    let body = session_client()
        .get(format!(
            "{}/establishment_owner_response_weclean_owner",
            base_url()
        ))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Good wash, slow counter"));
    assert!(body.contains("We added a second attendant on weekends."));
    // Only the owner sees reply forms
    assert!(!body.contains("/replies\""));
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_search_is_case_insensitive() {
    let body = session_client()
        .get(format!("{}/search_result?q=nonstop", base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Nonstop Laundry Shop Malate"));
    assert!(!body.contains("Weclean Laundry Shop"));
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_bad_password_redirects_with_error() {
    let resp = session_client()
        .post(format!("{}/log_in", base_url()))
        .form(&[("username", "althea"), ("password", "not-her-password")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/log_in?error=credentials");
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_login_then_logout() {
    let client = session_client();
    log_in(&client, "althea", "sunnyday-2024").await;

    let resp = client
        .get(format!("{}/profile", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Althea Santos"));

    client
        .post(format!("{}/log_out", base_url()))
        .send()
        .await
        .unwrap();

    let resp = client
        .get(format!("{}/profile", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/log_in");
}

// ============================================================================
// Reviews
// ============================================================================

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_composer_rejects_missing_rating() {
    let client = session_client();
    log_in(&client, "jessa.dl", "lavender-scent").await;

    let resp = client
        .post(format!("{}/XYZLaundryService/reviews", base_url()))
        .form(&[("title", "No stars"), ("comment", "Forgot to rate.")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/XYZLaundryService?error=missing_rating");
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_create_and_delete_review() {
    let client = session_client();
    log_in(&client, "jessa.dl", "lavender-scent").await;
    let shop_url = format!("{}/XYZLaundryService", base_url());

    let before = review_ids(&client.get(&shop_url).send().await.unwrap().text().await.unwrap());

    let resp = client
        .post(format!("{shop_url}/reviews"))
        .form(&[
            ("title", "Integration test review"),
            ("comment", "Pressed shirts, on time."),
            ("rate", "4"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let created = location(&resp);
    let id = created.rsplit("#review-").next().unwrap().to_string();

    let after = review_ids(&client.get(&shop_url).send().await.unwrap().text().await.unwrap());
    assert_eq!(after.len(), before.len() + 1);
    assert!(after.contains(&id));

    let resp = client
        .post(format!("{}/reviews/{id}/delete", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/XYZLaundryService");

    let remaining = review_ids(&client.get(&shop_url).send().await.unwrap().text().await.unwrap());
    assert_eq!(remaining, before);
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_reaction_toggle_does_not_drift() {
    let client = session_client();
    let page = client
        .get(format!("{}/7FoldsLaundry", base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let id = review_ids(&page).into_iter().next().unwrap();
    let url = format!("{}/reviews/{id}/reaction", base_url());

    let react = |action: &'static str| {
        let client = client.clone();
        let url = url.clone();
        async move {
            client
                .post(url)
                .form(&[("action", action)])
                .send()
                .await
                .unwrap()
                .json::<Value>()
                .await
                .unwrap()
        }
    };

    let liked = react("like").await;
    assert_eq!(liked["state"], "liked");

    let switched = react("dislike").await;
    assert_eq!(switched["state"], "disliked");
    assert_eq!(switched["likes"].as_i64().unwrap(), liked["likes"].as_i64().unwrap() - 1);
    assert_eq!(
        switched["dislikes"].as_i64().unwrap(),
        liked["dislikes"].as_i64().unwrap() + 1
    );

    let cleared = react("dislike").await;
    assert_eq!(cleared["state"], "none");
    assert_eq!(cleared["likes"], switched["likes"]);
    assert_eq!(
        cleared["dislikes"].as_i64().unwrap(),
        switched["dislikes"].as_i64().unwrap() - 1
    );
}

/// Publish a review as the logged-in user of `client` and return its id.
async fn create_review(client: &reqwest::Client, slug: &str, fields: &[(&str, &str)]) -> String {
    let resp = client
        .post(format!("{}/{slug}/reviews", base_url()))
        .form(fields)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let created = location(&resp);
    created.rsplit("#review-").next().unwrap().to_string()
}

async fn delete_review(client: &reqwest::Client, id: &str) {
    let resp = client
        .post(format!("{}/reviews/{id}/delete", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_only_the_author_can_edit() {
    let author = session_client();
    log_in(&author, "jessa.dl", "lavender-scent").await;
    let id = create_review(
        &author,
        "XYZLaundryService",
        &[("title", "Edit me"), ("comment", "First draft."), ("rate", "3")],
    )
    .await;
    let edit_url = format!("{}/reviews/{id}/edit", base_url());

    let stranger = session_client();
    log_in(&stranger, "althea", "sunnyday-2024").await;
    let resp = stranger
        .post(&edit_url)
        .form(&[("title", "Hijacked"), ("comment", "Not mine.")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = author
        .post(&edit_url)
        .form(&[("title", "Edited title"), ("comment", "Second draft.")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/XYZLaundryService#review-{id}"));

    let page = author
        .get(format!("{}/XYZLaundryService", base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Edited title"));
    assert!(!page.contains("Hijacked"));

    delete_review(&author, &id).await;
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_owner_replies_to_own_shop_only() {
    let reviewer = session_client();
    log_in(&reviewer, "althea", "sunnyday-2024").await;
    let id = create_review(
        &reviewer,
        "Weclean",
        &[("title", "Reply wanted"), ("comment", "Any weekend promos?"), ("rate", "4")],
    )
    .await;
    let reply_url = format!("{}/reviews/{id}/replies", base_url());

    let other_owner = session_client();
    log_in(&other_owner, "sevenfolds_owner", "sevenfolds-pass").await;
    let resp = other_owner
        .post(&reply_url)
        .form(&[("content", "Come to 7Folds instead!")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let owner = session_client();
    log_in(&owner, "weclean_owner", "weclean-owner-pass").await;
    let resp = owner
        .post(&reply_url)
        .form(&[("content", "   ")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        "/establishment_owner_response_weclean_owner?error=invalid_reply"
    );

    let resp = owner
        .post(&reply_url)
        .form(&[("content", "Ten percent off every Sunday.")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp),
        format!("/establishment_owner_response_weclean_owner#review-{id}")
    );

    let page = reviewer
        .get(format!("{}/Weclean", base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Ten percent off every Sunday."));
    assert!(!page.contains("Come to 7Folds instead!"));

    delete_review(&reviewer, &id).await;
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_concurrent_reactions_from_one_visitor_do_not_drift() {
    let client = session_client();
    let page = client
        .get(format!("{}/XYZLaundryService", base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let id = review_ids(&page).into_iter().next().unwrap();
    let url = format!("{}/reviews/{id}/reaction", base_url());

    let react = |action: &'static str| {
        let client = client.clone();
        let url = url.clone();
        async move {
            client
                .post(url)
                .form(&[("action", action)])
                .send()
                .await
                .unwrap()
                .json::<Value>()
                .await
                .unwrap()
        }
    };

    // Like then unlike, so the session holds a visitor key and the state is clear.
    react("like").await;
    let baseline = react("like").await;
    assert_eq!(baseline["state"], "none");

    let (first, second) = tokio::join!(react("like"), react("like"));
    let mut states = [
        first["state"].as_str().unwrap().to_string(),
        second["state"].as_str().unwrap().to_string(),
    ];
    states.sort();
    assert_eq!(states, ["liked", "none"]);

    let (liked, cleared) = if first["state"] == "liked" {
        (first, second)
    } else {
        (second, first)
    };
    assert_eq!(
        liked["likes"].as_i64().unwrap(),
        baseline["likes"].as_i64().unwrap() + 1
    );
    assert_eq!(cleared["likes"], baseline["likes"]);
    assert_eq!(cleared["dislikes"], baseline["dislikes"]);

    let (first, second) = tokio::join!(react("like"), react("dislike"));
    let mut states = [
        first["state"].as_str().unwrap().to_string(),
        second["state"].as_str().unwrap().to_string(),
    ];
    states.sort();
    assert_eq!(states, ["disliked", "liked"]);
    let total = |v: &Value| v["likes"].as_i64().unwrap() + v["dislikes"].as_i64().unwrap();
    let baseline_total = total(&baseline);
    assert_eq!(total(&first), baseline_total + 1);
    assert_eq!(total(&second), baseline_total + 1);

    // The page shows whichever click landed last; undoing it restores the counts.
    let page = client
        .get(format!("{}/XYZLaundryService", base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let marker = format!("data-review-id=\"{id}\" data-reaction=\"");
    let stored = page
        .split(&marker)
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap()
        .to_string();
    let undo = if stored == "liked" { "like" } else { "dislike" };
    let last = react(undo).await;
    assert_eq!(last["state"], "none");
    assert_eq!(last["likes"], baseline["likes"]);
    assert_eq!(last["dislikes"], baseline["dislikes"]);
}

#[tokio::test]
#[ignore = "Requires running web server"]
async fn test_review_with_image_link_and_report() {
    let author = session_client();
    log_in(&author, "paolo", "spin-cycle-88").await;

    let resp = author
        .post(format!("{}/NonstopLaundryShopMalate/reviews", base_url()))
        .form(&[
            ("title", "Bad link"),
            ("comment", "Script instead of a photo."),
            ("rate", "3"),
            ("image_url", "javascript:alert(1)"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&resp),
        "/NonstopLaundryShopMalate?error=invalid_image_url"
    );

    let id = create_review(
        &author,
        "NonstopLaundryShopMalate",
        &[
            ("title", "Photo attached"),
            ("comment", "See the folding for yourself."),
            ("rate", "5"),
            ("image_url", "https://images.example.com/folded.jpg"),
        ],
    )
    .await;
    let page = author
        .get(format!("{}/NonstopLaundryShopMalate", base_url()))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("src=\"https://images.example.com/folded.jpg\""));

    // Anonymous visitors may report; repeats are acknowledged but not counted.
    let visitor = session_client();
    let report_url = format!("{}/reviews/{id}/report", base_url());
    let first: Value = visitor
        .post(&report_url)
        .form(&[("reason", "Looks like an advert")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["reported"], true);
    assert_eq!(first["first_report"], true);

    let again: Value = visitor
        .post(&report_url)
        .form(&[("reason", "")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["reported"], true);
    assert_eq!(again["first_report"], false);

    let resp = visitor
        .post(format!("{}/reviews/999999999/report", base_url()))
        .form(&[("reason", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    delete_review(&author, &id).await;
}
