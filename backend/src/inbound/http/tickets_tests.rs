//! Tests for ticket HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{memory_state, start_client};

fn accounting_to<'a>(ticket: &'a Value, user_id: &str) -> Option<&'a Value> {
    ticket["accountings"]
        .as_array()
        .expect("accountings array")
        .iter()
        .find(|accounting| accounting["userTo"] == user_id)
}

#[rstest]
#[case(
    json!({ "name": "pizza", "price": 10, "participants": ["alice"] }),
    None,
    Some(RawScalar::Number(10.0))
)]
#[case(
    json!({ "name": "pizza", "quantity": "3", "price": "2.5", "participants": [{ "username": "alice" }] }),
    Some(RawScalar::Text("3".to_owned())),
    Some(RawScalar::Text("2.5".to_owned()))
)]
#[case(
    json!({ "name": "pizza", "quantity": true, "price": [4], "participants": ["alice"] }),
    None,
    None
)]
fn item_bodies_accept_loose_scalars(
    #[case] raw: Value,
    #[case] quantity: Option<RawScalar>,
    #[case] price: Option<RawScalar>,
) {
    let body: ItemBody = serde_json::from_value(raw).expect("item body");

    let item = RawItem::from(body);

    assert_eq!(item.name.as_deref(), Some("pizza"));
    assert_eq!(item.quantity, quantity);
    assert_eq!(item.price, price);
    assert_eq!(item.participants, vec!["alice".to_owned()]);
}

#[rstest]
fn empty_item_list_is_rejected_before_splitting() {
    let err = TicketItemsBody { items: vec![] }
        .into_raw_items()
        .expect_err("empty list rejected");

    assert_eq!(err.details(), Some(&json!({ "code": "no_items", "index": null })));
}

#[rstest]
#[actix_web::test]
async fn create_splits_items_and_returns_created_ticket() {
    let (state, _) = memory_state();
    let client = start_client(state).await;
    let alice = client.register_id("alice").await;
    let bob = client.register_id("bob").await;
    let cookie = client.login(&alice).await;

    let res = client
        .post_json(
            "/api/v1/tickets",
            Some(&cookie),
            &json!({ "items": [
                { "name": "pizza", "quantity": 2, "price": "10", "participants": ["alice", { "username": "bob" }] }
            ]}),
        )
        .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let ticket: Value = actix_test::read_body_json(res).await;
    assert_eq!(ticket["buyer"], alice);
    assert_eq!(ticket["items"][0]["quantity"], 2);
    assert_eq!(ticket["items"][0]["price"], 10.0);
    assert_eq!(ticket["accountings"].as_array().map(Vec::len), Some(1));
    let debt = accounting_to(&ticket, &bob).expect("bob owes alice");
    assert_eq!(debt["userFrom"], alice);
    assert_eq!(debt["totalPrice"], 10.0);
    assert_eq!(debt["paidPrice"], 0.0);
}

#[rstest]
#[case(json!({ "items": [] }), "no_items")]
#[case(json!({ "items": [{ "price": 1, "participants": ["alice"] }] }), "missing_name")]
#[case(json!({ "items": [{ "name": "tea", "price": -1, "participants": ["alice"] }] }), "invalid_price")]
#[case(json!({ "items": [{ "name": "tea", "price": 1, "participants": [] }] }), "no_participants")]
#[case(json!({ "items": [{ "name": "tea", "price": 1, "participants": ["mallory"] }] }), "unknown_user")]
#[actix_web::test]
async fn invalid_ticket_input_is_a_bad_request(#[case] body: Value, #[case] code: &str) {
    let (state, _) = memory_state();
    let client = start_client(state).await;
    let alice = client.register_id("alice").await;
    let cookie = client.login(&alice).await;

    let res = client.post_json("/api/v1/tickets", Some(&cookie), &body).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error: Value = actix_test::read_body_json(res).await;
    assert_eq!(error["code"], "invalid_request");
    assert_eq!(error["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn malformed_body_is_a_bad_request() {
    let (state, _) = memory_state();
    let client = start_client(state).await;
    let alice = client.register_id("alice").await;
    let cookie = client.login(&alice).await;

    let res = client
        .post_json("/api/v1/tickets", Some(&cookie), &json!({ "items": "pizza" }))
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn creating_without_a_session_is_unauthorised() {
    let (state, _) = memory_state();
    let client = start_client(state).await;

    let res = client
        .post_json("/api/v1/tickets", None, &json!({ "items": [] }))
        .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn edit_moves_overpayment_onto_a_refund_ticket() {
    let (state, _) = memory_state();
    let client = start_client(state).await;
    let alice = client.register_id("alice").await;
    let bob = client.register_id("bob").await;
    let alice_cookie = client.login(&alice).await;
    let bob_cookie = client.login(&bob).await;

    let created: Value = actix_test::read_body_json(
        client
            .post_json(
                "/api/v1/tickets",
                Some(&alice_cookie),
                &json!({ "items": [{ "name": "pizza", "price": 10, "participants": ["alice", "bob"] }] }),
            )
            .await,
    )
    .await;
    let ticket_id = created["id"].as_str().expect("ticket id").to_owned();
    let accounting_id = accounting_to(&created, &bob).expect("bob's debt")["id"]
        .as_str()
        .expect("accounting id")
        .to_owned();
    let settled = client
        .post(&format!("/api/v1/debts/{accounting_id}/settle"), Some(&bob_cookie))
        .await;
    assert_eq!(settled.status(), StatusCode::OK);

    let res = client
        .patch_json(
            &format!("/api/v1/tickets/{ticket_id}"),
            Some(&alice_cookie),
            &json!({ "items": [{ "name": "pizza", "price": 10, "participants": ["alice"] }] }),
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let edited: Value = actix_test::read_body_json(res).await;
    assert_eq!(edited["accountings"], json!([]));

    let bobs_tickets: Value =
        actix_test::read_body_json(client.get("/api/v1/tickets", Some(&bob_cookie)).await).await;
    let refund = &bobs_tickets[0];
    assert_eq!(refund["buyer"], bob);
    assert_eq!(refund["items"][0]["name"], "Refund ticket update");
    assert_eq!(refund["items"][0]["price"], 5.0);
    let owed = accounting_to(refund, &alice).expect("refund edge to editor");
    assert_eq!(owed["userFrom"], bob);
    assert_eq!(owed["totalPrice"], 5.0);
    assert_eq!(owed["paidPrice"], 0.0);
}

#[rstest]
#[actix_web::test]
async fn only_the_buyer_may_edit_or_delete() {
    let (state, _) = memory_state();
    let client = start_client(state).await;
    let alice = client.register_id("alice").await;
    let bob = client.register_id("bob").await;
    let alice_cookie = client.login(&alice).await;
    let bob_cookie = client.login(&bob).await;
    let body = json!({ "items": [{ "name": "tea", "price": 4, "participants": ["alice", "bob"] }] });
    let created: Value = actix_test::read_body_json(
        client.post_json("/api/v1/tickets", Some(&alice_cookie), &body).await,
    )
    .await;
    let uri = format!("/api/v1/tickets/{}", created["id"].as_str().expect("id"));

    let visible = client.get(&uri, Some(&bob_cookie)).await;
    let edit = client.patch_json(&uri, Some(&bob_cookie), &body).await;
    let delete = client.delete(&uri, Some(&bob_cookie)).await;

    assert_eq!(visible.status(), StatusCode::OK);
    assert_eq!(edit.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(delete.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn delete_removes_the_ticket() {
    let (state, _) = memory_state();
    let client = start_client(state).await;
    let alice = client.register_id("alice").await;
    let cookie = client.login(&alice).await;
    let created: Value = actix_test::read_body_json(
        client
            .post_json(
                "/api/v1/tickets",
                Some(&cookie),
                &json!({ "items": [{ "name": "tea", "price": 4, "participants": ["alice"] }] }),
            )
            .await,
    )
    .await;
    let uri = format!("/api/v1/tickets/{}", created["id"].as_str().expect("id"));

    let deleted = client.delete(&uri, Some(&cookie)).await;
    let fetched = client.get(&uri, Some(&cookie)).await;

    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn malformed_ticket_id_is_a_bad_request() {
    let (state, _) = memory_state();
    let client = start_client(state).await;
    let alice = client.register_id("alice").await;
    let cookie = client.login(&alice).await;

    let res = client.get("/api/v1/tickets/42", Some(&cookie)).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error: Value = actix_test::read_body_json(res).await;
    assert_eq!(error["details"]["field"], "ticketId");
}
