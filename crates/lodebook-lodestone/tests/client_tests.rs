//! Integration tests for the Lodestone client using wiremock.

use serde_json::json;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lodebook_lodestone::{LodestoneClient, LodestoneConfig, LodestoneError};

const FC_ID: &str = "9228860398435772612";

fn member(id: u64, name: &str, rank: &str) -> serde_json::Value {
    json!({
        "ID": id,
        "Name": name,
        "Rank": rank,
        "RankIcon": format!("https://img.example/{rank}.png"),
        "Avatar": format!("https://img.example/{id}.png"),
        "FeastMatches": 0
    })
}

fn client(server: &MockServer) -> LodestoneClient {
    LodestoneClient::new(LodestoneConfig::new(server.uri(), FC_ID)).unwrap()
}

#[tokio::test]
async fn fetches_single_page_roster() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/freecompany/{FC_ID}")))
        .and(query_param("data", "FCM"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "FreeCompanyMembers": [
                member(1, "Puk Waddle", "Mandragora"),
                member(2, "Koko Kopo", "Coeurl Hunter"),
            ],
            "Pagination": { "Page": 1, "PageTotal": 1 }
        })))
        .mount(&server)
        .await;

    let entries = client(&server).fetch_members().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].character_id, "1");
    assert_eq!(entries[0].name, "Puk Waddle");
    assert_eq!(entries[1].rank, "Coeurl Hunter");
}

#[tokio::test]
async fn follows_pagination_to_the_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/freecompany/{FC_ID}")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "FreeCompanyMembers": [member(1, "Puk Waddle", "Mandragora")],
            "Pagination": { "Page": 1, "PageTotal": 3 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/freecompany/{FC_ID}")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "FreeCompanyMembers": [member(2, "Koko Kopo", "Mandragora")],
            "Pagination": { "Page": 2, "PageTotal": 3 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/freecompany/{FC_ID}")))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "FreeCompanyMembers": [member(3, "Mog Mhigo", "Sprout")],
            "Pagination": { "Page": 3, "PageTotal": 3 }
        })))
        .mount(&server)
        .await;

    let entries = client(&server).fetch_members().await.unwrap();
    let ids: Vec<_> = entries.iter().map(|e| e.character_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn sends_api_key_as_private_key_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/freecompany/{FC_ID}")))
        .and(query_param("private-key", "sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "FreeCompanyMembers": [member(1, "Puk Waddle", "Mandragora")],
            "Pagination": { "Page": 1, "PageTotal": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LodestoneClient::new(
        LodestoneConfig::new(server.uri(), FC_ID).with_api_key("sekrit"),
    )
    .unwrap();

    let entries = client.fetch_members().await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn maps_error_status_with_transience() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_members().await.unwrap_err();
    match &err {
        LodestoneError::Status { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Status, got {other:?}"),
    }
    assert!(err.is_transient());

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let err = client(&server).fetch_members().await.unwrap_err();
    assert!(!err.is_transient());
}

#[tokio::test]
async fn missing_member_array_yields_empty_roster() {
    // The engine's minimum-size guard decides what to do with this.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Pagination": { "Page": 1, "PageTotal": 1 }
        })))
        .mount(&server)
        .await;

    let entries = client(&server).fetch_members().await.unwrap();
    assert!(entries.is_empty());
}
