//! Integration tests for the Diesel ticket and accounting repositories.
//!
//! These run against embedded PostgreSQL and cover the transactional edit
//! write, settlement in both directions and the outstanding-balance filter.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tabsplit_backend::domain::ports::{
    AccountingFilter, AccountingRepository, SettlementScope, TicketPersistenceError,
    TicketRepository, UserRepository,
};
use tabsplit_backend::domain::{
    Accounting, Participant, REFUND_ITEM_NAME, RawItem, RawScalar, Ticket, TicketId, User, UserId,
    Username, build_accountings, reconcile, split_items,
};
use tabsplit_backend::outbound::persistence::{
    DbPool, DieselAccountingRepository, DieselTicketRepository, DieselUserRepository, PoolConfig,
};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, provision_template_database, shared_cluster_handle};

struct TestContext {
    runtime: Runtime,
    tickets: DieselTicketRepository,
    accountings: DieselAccountingRepository,
    users: HashMap<String, User>,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn user(&self, name: &str) -> User {
        self.users.get(name).cloned().expect("seeded user")
    }

    fn id(&self, name: &str) -> UserId {
        self.user(name).id()
    }

    fn directory(&self) -> HashMap<String, Participant> {
        self.users
            .iter()
            .map(|(name, user)| (name.clone(), Participant::from(user)))
            .collect()
    }

    /// Build and store a single-item ticket paid by `buyer`.
    fn create_ticket(
        &self,
        buyer: &str,
        price: f64,
        participants: &[&str],
        created_at: DateTime<Utc>,
    ) -> Ticket {
        let outcome =
            split_items(&[raw_item("pizza", price, participants)], &self.directory())
                .expect("valid items");
        let id = TicketId::random();
        let buyer = self.id(buyer);
        let ticket = Ticket {
            id,
            buyer,
            created_at,
            items: outcome.items,
            accountings: build_accountings(id, &outcome.amounts, buyer),
        };
        self.runtime
            .block_on(self.tickets.create(&ticket))
            .expect("ticket stored");
        ticket
    }

    fn load(&self, id: &TicketId) -> Option<Ticket> {
        self.runtime
            .block_on(self.tickets.find_by_id(id))
            .expect("ticket loads")
    }

    fn settle(&self, scope: SettlementScope) -> Vec<Accounting> {
        self.runtime
            .block_on(self.accountings.settle(&scope))
            .expect("settlement succeeds")
    }
}

fn raw_item(name: &str, price: f64, participants: &[&str]) -> RawItem {
    RawItem {
        name: Some(name.to_owned()),
        quantity: None,
        price: Some(RawScalar::Number(price)),
        participants: participants.iter().map(|p| (*p).to_owned()).collect(),
    }
}

// PostgreSQL keeps microseconds, so fixtures use whole-second timestamps.
fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn sorted(mut ticket: Ticket) -> Ticket {
    ticket
        .accountings
        .sort_by_key(|accounting| *accounting.user_to.as_uuid());
    ticket
}

fn accounting_between(ticket: &Ticket, user_from: &UserId, user_to: &UserId) -> Accounting {
    ticket
        .accountings
        .iter()
        .find(|a| a.user_from == *user_from && a.user_to == *user_to)
        .cloned()
        .expect("accounting present")
}

fn seed_users(runtime: &Runtime, pool: &DbPool) -> Result<HashMap<String, User>, String> {
    let repository = DieselUserRepository::new(pool.clone());
    let mut users = HashMap::new();
    for name in ["alice", "bob", "carol"] {
        let username = Username::new(name).map_err(|err| err.to_string())?;
        let user = User::new(UserId::random(), username, at(8));
        runtime
            .block_on(repository.insert(&user))
            .map_err(|err| err.to_string())?;
        users.insert(name.to_owned(), user);
    }
    Ok(users)
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let temp_db = provision_template_database(cluster)?;
    let database_url = temp_db.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;
    let users = seed_users(&runtime, &pool)?;

    Ok(TestContext {
        runtime,
        tickets: DieselTicketRepository::new(pool.clone()),
        accountings: DieselAccountingRepository::new(pool),
        users,
        _database: temp_db,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn edit_with_refund_commits_both_tickets(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: edit_with_refund_commits_both_tickets skipped");
        return;
    };
    let (alice, bob) = (context.id("alice"), context.id("bob"));
    let ticket = context.create_ticket("alice", 30.0, &["alice", "bob", "carol"], at(12));
    let bob_share = accounting_between(&ticket, &alice, &bob);
    context.settle(SettlementScope::Debt {
        accounting: bob_share.id,
        user_to: bob,
    });
    let existing = context.load(&ticket.id).expect("ticket exists");

    let outcome = split_items(
        &[raw_item("pizza", 30.0, &["alice", "carol"])],
        &context.directory(),
    )
    .expect("valid items");
    let edit = reconcile(existing, outcome, &context.user("alice"), at(13));
    assert_eq!(edit.refunds.len(), 1);

    context
        .runtime
        .block_on(context.tickets.save_edit(&edit.ticket, &edit.refunds))
        .expect("edit commits");

    let stored = context.load(&ticket.id).expect("edited ticket exists");
    assert_eq!(sorted(stored), sorted(edit.ticket.clone()));
    assert!(edit.ticket.accountings.iter().all(|a| a.user_to != bob));

    let refunds = context
        .runtime
        .block_on(context.tickets.list_by_buyer(&bob))
        .expect("refunds load");
    assert_eq!(refunds.len(), 1);
    let refund = &refunds[0];
    assert_eq!(refund.items[0].name, REFUND_ITEM_NAME);
    assert_eq!(refund.accountings.len(), 1);
    assert_eq!(refund.accountings[0].user_from, bob);
    assert_eq!(refund.accountings[0].user_to, alice);
    assert_eq!(refund.accountings[0].total_price, bob_share.total_price);
    assert_eq!(refund.total_cost(), bob_share.total_price);
}

#[rstest]
fn failed_edit_rolls_back_every_write(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: failed_edit_rolls_back_every_write skipped");
        return;
    };
    let (alice, bob) = (context.id("alice"), context.id("bob"));
    let ticket = context.create_ticket("alice", 30.0, &["alice", "bob", "carol"], at(12));
    context.settle(SettlementScope::Debt {
        accounting: accounting_between(&ticket, &alice, &bob).id,
        user_to: bob,
    });
    let before = context.load(&ticket.id).expect("ticket exists");

    let outcome = split_items(
        &[raw_item("salad", 9.0, &["alice", "carol"])],
        &context.directory(),
    )
    .expect("valid items");
    let mut edit = reconcile(before.clone(), outcome, &context.user("alice"), at(13));
    // The refund insert runs after the edit's own writes and hits the primary key.
    edit.refunds[0].id = ticket.id;

    let err = context
        .runtime
        .block_on(context.tickets.save_edit(&edit.ticket, &edit.refunds))
        .expect_err("duplicate refund id");
    assert!(matches!(err, TicketPersistenceError::Query { .. }));

    let after = context.load(&ticket.id).expect("ticket still exists");
    assert_eq!(sorted(after), sorted(before));
    let refunds = context
        .runtime
        .block_on(context.tickets.list_by_buyer(&bob))
        .expect("tickets load");
    assert!(refunds.is_empty());
}

#[rstest]
fn settling_between_users_covers_both_directions(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: settling_between_users_covers_both_directions skipped");
        return;
    };
    let (alice, bob, carol) = (context.id("alice"), context.id("bob"), context.id("carol"));
    let lunch = context.create_ticket("alice", 20.0, &["alice", "bob", "carol"], at(12));
    let dinner = context.create_ticket("bob", 16.0, &["alice", "bob"], at(19));

    let settled = context.settle(SettlementScope::Between {
        user: alice,
        counterparty: bob,
    });

    assert_eq!(settled.len(), 2);
    assert!(settled.iter().all(|a| a.paid_price == a.total_price));
    let lunch = context.load(&lunch.id).expect("lunch exists");
    let dinner = context.load(&dinner.id).expect("dinner exists");
    assert!(!accounting_between(&lunch, &alice, &bob).is_outstanding());
    assert!(!accounting_between(&dinner, &bob, &alice).is_outstanding());
    assert_eq!(accounting_between(&lunch, &alice, &carol).paid_price, 0.0);
}

#[rstest]
fn settlement_requires_the_matching_endpoint(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: settlement_requires_the_matching_endpoint skipped");
        return;
    };
    let (alice, bob, carol) = (context.id("alice"), context.id("bob"), context.id("carol"));
    let ticket = context.create_ticket("alice", 20.0, &["alice", "bob"], at(12));
    let share = accounting_between(&ticket, &alice, &bob);

    let by_stranger = context.settle(SettlementScope::Debt {
        accounting: share.id,
        user_to: carol,
    });
    assert!(by_stranger.is_empty());

    let by_creditor = context.settle(SettlementScope::Credit {
        accounting: share.id,
        user_from: alice,
    });
    assert_eq!(by_creditor.len(), 1);
    assert_eq!(by_creditor[0].paid_price, 10.0);
}

#[rstest]
fn outstanding_filter_skips_settled_rows(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: outstanding_filter_skips_settled_rows skipped");
        return;
    };
    let (alice, bob) = (context.id("alice"), context.id("bob"));
    let paid = context.create_ticket("alice", 12.0, &["alice", "bob"], at(10));
    let open = context.create_ticket("alice", 8.0, &["alice", "bob"], at(11));
    context.settle(SettlementScope::Debt {
        accounting: accounting_between(&paid, &alice, &bob).id,
        user_to: bob,
    });

    let outstanding = context
        .runtime
        .block_on(context.accountings.list_entries(&AccountingFilter::Outstanding {
            user_from: alice,
            user_to: bob,
        }))
        .expect("entries load");
    assert_eq!(outstanding.len(), 1);
    assert_eq!(outstanding[0].accounting.ticket_id, open.id);
    assert_eq!(outstanding[0].accounting.total_price, 4.0);
    assert_eq!(outstanding[0].items[0].name, "pizza");

    let settled = context
        .runtime
        .block_on(context.accountings.list_entries(&AccountingFilter::PaidToUser(bob)))
        .expect("entries load");
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].accounting.ticket_id, paid.id);
}
