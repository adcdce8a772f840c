use mockito::{Matcher, Server};
use serde_json::json;
use tubechef::{import_recipe, AppConfig, ImportError, RecipeExtractor, TranscriptRecord};

fn test_config(server_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.youtube.api_key = Some("fake_api_key".to_string());
    config.youtube.api_base_url = server_url.to_string();
    config.youtube.watch_base_url = server_url.to_string();
    config.retry.fetch_delay_ms = 0;
    config.openai.api_key = Some("fake_api_key".to_string());
    config.openai.base_url = server_url.to_string();
    config
}

const GARLIC_PASTA_TIMEDTEXT: &str = r#"<transcript>
<text start="30.0" dur="8.0">For this recipe you need 200 grams of spaghetti, 4 cloves of garlic and a quarter cup of olive oil</text>
<text start="60.0" dur="6.0">Bring a large pot of salted water to boil and cook the pasta al dente</text>
<text start="180.0" dur="7.0">Slowly heat the olive oil and add the minced garlic on medium-low</text>
<text start="330.0" dur="7.0">This recipe serves 2-3 people and takes about 15 minutes to prep and 10 minutes to cook</text>
</transcript>"#;

fn garlic_pasta_completion() -> String {
    let recipe = json!({
        "title": "Quick and Easy Garlic Pasta",
        "ingredients": [
            {"name": "spaghetti", "quantity": "200g"},
            {"name": "garlic", "quantity": "4 cloves"},
            {"name": "olive oil", "quantity": "1/4 cup"}
        ],
        "steps": [
            {"step_number": 1, "description": "Bring a large pot of salted water to boil"},
            {"step_number": 2, "description": "Cook the pasta al dente"},
            {"step_number": 3, "description": "Infuse the olive oil with minced garlic and toss with the pasta"}
        ],
        "servings": "2-3",
        "prep_time": "15 minutes",
        "cook_time": "10 minutes",
        "nutritional_info": {"calories": 520.0, "protein": 14.0, "carbs": 70.0, "fat": 18.0}
    });

    json!({"choices": [{"message": {"content": recipe.to_string()}}]}).to_string()
}

/// The garlic-pasta scenario end to end: resolve by id, fetch the captions,
/// generate, and check the fields the transcript states
#[tokio::test]
async fn test_garlic_pasta_pipeline() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/videos")
        .match_query(Matcher::UrlEncoded("id".into(), "garlic123".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"items": [{"id": "garlic123", "snippet": {"title": "Quick and Easy Garlic Pasta"}}]}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/watch")
        .match_query(Matcher::UrlEncoded("v".into(), "garlic123".into()))
        .with_status(200)
        .with_body(format!(
            r#"<html><script>{{"captionTracks":[{{"baseUrl":"{}/api/timedtext","languageCode":"en"}}]}}</script></html>"#,
            server.url()
        ))
        .create_async()
        .await;
    server
        .mock("GET", "/api/timedtext")
        .with_status(200)
        .with_body(GARLIC_PASTA_TIMEDTEXT)
        .create_async()
        .await;
    let completion_mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(garlic_pasta_completion())
        .expect(1)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let recipe = import_recipe(&config, "garlic123").await.unwrap();

    assert_eq!(recipe.video_id, "garlic123");
    assert!(!recipe.ingredients.is_empty());
    assert!(!recipe.steps.is_empty());
    let servings = recipe.servings.as_deref().unwrap();
    assert!(servings.contains("2") || servings.contains("2-3"));
    assert!(recipe.prep_time.as_deref().unwrap().contains("15"));
    assert!(recipe.cook_time.as_deref().unwrap().contains("10"));
    completion_mock.assert_async().await;
}

/// An empty or whitespace-only transcript is rejected with zero network calls
#[tokio::test]
async fn test_empty_transcript_makes_no_network_calls() {
    let mut server = Server::new_async().await;
    let completion_mock = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let mut extractor = RecipeExtractor::new(&config).unwrap();

    for text in ["", "   \n\t  "] {
        let record = TranscriptRecord {
            title: "Empty".to_string(),
            video_id: "empty1".to_string(),
            language_code: "en".to_string(),
            is_generated: false,
            text: text.to_string(),
            error: None,
        };
        let err = extractor.generate(&record).await.unwrap_err();
        assert!(matches!(err, ImportError::EmptyInput));
    }
    completion_mock.assert_async().await;
}

/// A generation response with null content is classified as an empty
/// response, not invalid JSON
#[tokio::test]
async fn test_null_completion_content_is_empty_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": [{"message": {"content": null}}]}"#)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let mut extractor = RecipeExtractor::new(&config).unwrap();
    let record = TranscriptRecord {
        title: "Garlic Pasta".to_string(),
        video_id: "abc123".to_string(),
        language_code: "en".to_string(),
        is_generated: false,
        text: "some transcript text".to_string(),
        error: None,
    };

    let err = extractor.generate(&record).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Empty response"));
    assert!(!message.contains("JSON"));
}

/// A completion whose content is prose rather than JSON is a distinct error
#[tokio::test]
async fn test_prose_completion_is_invalid_json() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices": [{"message": {"content": "Sure! Here is your recipe: ..."}}]}"#,
        )
        .create_async()
        .await;

    let config = test_config(&server.url());
    let mut extractor = RecipeExtractor::new(&config).unwrap();
    let record = TranscriptRecord {
        title: "Garlic Pasta".to_string(),
        video_id: "abc123".to_string(),
        language_code: "en".to_string(),
        is_generated: false,
        text: "some transcript text".to_string(),
        error: None,
    };

    let err = extractor.generate(&record).await.unwrap_err();
    assert!(matches!(
        err,
        ImportError::ModelResponse(tubechef::ModelResponseError::InvalidJson(_))
    ));
}
