//! Tests for ledger HTTP handlers.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{memory_state, start_client};

struct Party {
    id: String,
    cookie: Cookie<'static>,
}

fn ids(entries: &Value, field: &str) -> Vec<Value> {
    entries
        .as_array()
        .expect("array")
        .iter()
        .map(|entry| entry[field].clone())
        .collect()
}

fn dinner() -> Value {
    json!({ "items": [
        { "name": "pizza", "price": 12, "participants": ["alice", "bob", "carol"] },
        { "name": "wine", "price": 6, "participants": ["bob", "carol"] }
    ]})
}

macro_rules! setup {
    ($client:ident, $alice:ident, $bob:ident, $carol:ident) => {
        let (state, _) = memory_state();
        let $client = start_client(state).await;
        let mut parties = Vec::new();
        for name in ["alice", "bob", "carol"] {
            let id = $client.register_id(name).await;
            let cookie = $client.login(&id).await;
            parties.push(Party { id, cookie });
        }
        let $carol = parties.pop().expect("carol");
        let $bob = parties.pop().expect("bob");
        let $alice = parties.pop().expect("alice");
        let created = $client
            .post_json("/api/v1/tickets", Some(&$alice.cookie), &dinner())
            .await;
        assert_eq!(created.status(), StatusCode::CREATED);
    };
}

async fn json_body(res: actix_web::dev::ServiceResponse) -> Value {
    actix_test::read_body_json(res).await
}

#[rstest]
#[actix_web::test]
async fn debts_and_credits_are_seen_from_both_ends() {
    setup!(client, alice, bob, carol);

    let bob_debts = json_body(client.get("/api/v1/debts", Some(&bob.cookie)).await).await;
    let alice_credits = json_body(client.get("/api/v1/credits", Some(&alice.cookie)).await).await;
    let alice_debts = json_body(client.get("/api/v1/debts", Some(&alice.cookie)).await).await;

    assert_eq!(ids(&bob_debts, "userFrom"), vec![json!(alice.id)]);
    assert_eq!(bob_debts[0]["totalPrice"], 7.0);
    assert!(bob_debts[0]["ticketCreatedAt"].is_string());
    assert_eq!(bob_debts[0]["items"].as_array().map(Vec::len), Some(2));
    let mut debtors = ids(&alice_credits, "userTo");
    debtors.sort_by_key(|value| value.to_string());
    let mut expected = vec![json!(bob.id), json!(carol.id)];
    expected.sort_by_key(|value| value.to_string());
    assert_eq!(debtors, expected);
    assert_eq!(alice_debts, json!([]));
}

#[rstest]
#[actix_web::test]
async fn counterparty_views_hide_unrelated_items() {
    setup!(client, alice, bob, carol);

    let owed_to_alice = json_body(
        client
            .get(&format!("/api/v1/debts/{}", alice.id), Some(&bob.cookie))
            .await,
    )
    .await;
    let owed_by_carol = json_body(
        client
            .get(&format!("/api/v1/credits/{}", carol.id), Some(&alice.cookie))
            .await,
    )
    .await;

    assert_eq!(owed_to_alice.as_array().map(Vec::len), Some(1));
    assert_eq!(ids(&owed_to_alice[0]["items"], "name"), vec![json!("pizza")]);
    assert_eq!(
        ids(&owed_by_carol[0]["items"], "name"),
        vec![json!("pizza"), json!("wine")]
    );
}

#[rstest]
#[actix_web::test]
async fn settling_a_debt_moves_it_to_paid_debts() {
    setup!(client, alice, bob, carol);
    let debts = json_body(client.get("/api/v1/debts", Some(&bob.cookie)).await).await;
    let accounting_id = debts[0]["id"].as_str().expect("id").to_owned();

    let settled = json_body(
        client
            .post(&format!("/api/v1/debts/{accounting_id}/settle"), Some(&bob.cookie))
            .await,
    )
    .await;
    let paid = json_body(client.get("/api/v1/debts/paid", Some(&bob.cookie)).await).await;
    let outstanding = json_body(
        client
            .get(&format!("/api/v1/debts/{}", alice.id), Some(&bob.cookie))
            .await,
    )
    .await;

    assert_eq!(settled[0]["paidPrice"], settled[0]["totalPrice"]);
    assert_eq!(ids(&paid, "id"), vec![json!(accounting_id)]);
    assert_eq!(outstanding, json!([]));
    let carol_paid = json_body(client.get("/api/v1/debts/paid", Some(&carol.cookie)).await).await;
    assert_eq!(carol_paid, json!([]));
}

#[rstest]
#[actix_web::test]
async fn settlement_of_someone_elses_accounting_is_not_found() {
    setup!(client, alice, bob, carol);
    let debts = json_body(client.get("/api/v1/debts", Some(&bob.cookie)).await).await;
    let accounting_id = debts[0]["id"].as_str().expect("id").to_owned();

    let by_carol = client
        .post(&format!("/api/v1/debts/{accounting_id}/settle"), Some(&carol.cookie))
        .await;
    let as_creditor_by_debtor = client
        .post(&format!("/api/v1/credits/{accounting_id}/paid"), Some(&bob.cookie))
        .await;
    let as_creditor = client
        .post(&format!("/api/v1/credits/{accounting_id}/paid"), Some(&alice.cookie))
        .await;

    assert_eq!(by_carol.status(), StatusCode::NOT_FOUND);
    assert_eq!(as_creditor_by_debtor.status(), StatusCode::NOT_FOUND);
    assert_eq!(as_creditor.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn settling_with_a_counterparty_covers_both_directions() {
    setup!(client, alice, bob, carol);
    let lunch = json!({ "items": [{ "name": "soup", "price": 8, "participants": ["alice", "bob"] }] });
    let created = client.post_json("/api/v1/tickets", Some(&bob.cookie), &lunch).await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let settled = json_body(
        client
            .post(
                &format!("/api/v1/counterparties/{}/settle", alice.id),
                Some(&bob.cookie),
            )
            .await,
    )
    .await;
    let again = client
        .post(
            &format!("/api/v1/counterparties/{}/settle", carol.id),
            Some(&bob.cookie),
        )
        .await;

    assert_eq!(settled.as_array().map(Vec::len), Some(2));
    assert!(
        settled
            .as_array()
            .expect("array")
            .iter()
            .all(|accounting| accounting["paidPrice"] == accounting["totalPrice"])
    );
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    let carol_debts = json_body(client.get("/api/v1/debts/paid", Some(&carol.cookie)).await).await;
    assert_eq!(carol_debts, json!([]));
}

#[rstest]
#[actix_web::test]
async fn self_accountings_are_listed_separately() {
    setup!(client, alice, _bob, _carol);

    let res = client.get("/api/v1/accountings/self", Some(&alice.cookie)).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!([]));
}

#[rstest]
#[actix_web::test]
async fn ledger_routes_require_a_session() {
    let (state, _) = memory_state();
    let client = start_client(state).await;

    for uri in ["/api/v1/debts", "/api/v1/credits", "/api/v1/debts/paid", "/api/v1/accountings/self"] {
        let res = client.get(uri, None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}
