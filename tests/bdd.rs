use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use cucumber::{gherkin::Step, given, then, when, World as _};
use vanrent::{
    billing::{derive_billing, total_rent_sum, Billing},
    config::{AppConfig, SearchMode},
    filter::{filter_by_status, StatusFilter},
    models::{
        payment::PaymentDraft,
        trip::{Trip, TripDraft, TripEdit, TripPatch},
    },
    services::{
        dashboard,
        lookup::LookupService,
        payments::MemoryPaymentStore,
        trips::MemoryTripStore,
    },
    state::AppState,
};

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    state: Option<TestState>,
    billing: Option<Billing>,
    filtered: Vec<Trip>,
    last_added: Option<Trip>,
    last_error: Option<String>,
}

impl AppWorld {
    fn app_state(&self) -> &AppState {
        &self
            .state
            .as_ref()
            .expect("dashboard must be initialised first")
            .app
    }

    async fn displayed(&self) -> Vec<Trip> {
        self.app_state().trip_cache.read().await.results().to_vec()
    }

    async fn trip_of(&self, van: &str, date: &str) -> Trip {
        let date = day(date);
        self.app_state()
            .trip_cache
            .read()
            .await
            .all()
            .iter()
            .find(|trip| trip.van_number == van && trip.date == date)
            .cloned()
            .expect("trip must be cached")
    }
}

struct TestState {
    app: AppState,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("scenario dates are ISO")
}

fn status(raw: &str) -> StatusFilter {
    StatusFilter::from_param(raw)
}

#[given("a fresh dashboard")]
async fn given_fresh_dashboard(world: &mut AppWorld) {
    world.state = Some(TestState {
        app: AppState::in_memory(),
    });
}

#[given("a dashboard that searches locally")]
async fn given_local_dashboard(world: &mut AppWorld) {
    let mut config = AppConfig::in_memory();
    config.search_mode = SearchMode::Local;
    let app = AppState::new(
        config,
        Arc::new(MemoryTripStore::new()),
        Arc::new(MemoryPaymentStore::new()),
        LookupService::default(),
    );
    world.state = Some(TestState { app });
}

#[given("these trips are stored:")]
async fn given_trips(world: &mut AppWorld, step: &Step) {
    let table = step.table.as_ref().expect("trip table");
    let store = world.app_state().trips.clone();
    for row in table.rows.iter().skip(1) {
        let draft = TripDraft {
            van_number: row[0].clone(),
            date: row[1].clone(),
            pickup_location: row[2].clone(),
            dropoff_location: row[3].clone(),
            wayment: row[4].clone(),
            rent: row[5].clone(),
            misc_spending: row[6].clone(),
        };
        let trip = store
            .create(&draft.into_new_trip().expect("valid trip row"))
            .await
            .expect("store trip");
        if row[7] == "true" {
            let patch = TripPatch {
                paid: Some(true),
                ..TripPatch::default()
            };
            store.update(&trip.id, &patch).await.expect("mark paid");
        }
    }
    dashboard::refresh_trips(world.app_state())
        .await
        .expect("load trips");
}

#[when(regex = r#"^I derive billing for wayment "([^"]*)", rent "([^"]*)" and misc "([^"]*)"$"#)]
async fn when_derive(world: &mut AppWorld, wayment: String, rent: String, misc: String) {
    world.billing = Some(derive_billing(&wayment, &rent, &misc));
}

#[then(regex = r"^the trip has (\d+) bags and a total rent of (\d+)$")]
async fn then_billing(world: &mut AppWorld, bags: u32, total: u64) {
    let billing = world.billing.expect("billing derived");
    assert_eq!(billing.no_of_bags, bags);
    assert_eq!(billing.total_rent, total);
}

#[when(regex = r#"^I filter the table by status "([^"]*)"$"#)]
async fn when_filter(world: &mut AppWorld, raw: String) {
    let displayed = world.displayed().await;
    world.filtered = filter_by_status(&displayed, status(&raw))
        .into_iter()
        .cloned()
        .collect();
}

#[then(regex = r"^(\d+) trips? (?:is|are) listed$")]
async fn then_listed(world: &mut AppWorld, count: usize) {
    assert_eq!(world.filtered.len(), count);
}

#[then(regex = r"^every listed trip is (paid|unpaid)$")]
async fn then_every_listed(world: &mut AppWorld, raw: String) {
    let expected = raw == "paid";
    assert!(world.filtered.iter().all(|trip| trip.paid == expected));
}

#[then(regex = r#"^the listed vans are "([^"]*)"$"#)]
async fn then_listed_vans(world: &mut AppWorld, vans: String) {
    let listed: Vec<&str> = world
        .filtered
        .iter()
        .map(|trip| trip.van_number.as_str())
        .collect();
    let expected: Vec<&str> = vans.split(", ").collect();
    assert_eq!(listed, expected);
}

#[when(regex = r#"^I search for "([^"]*)"$"#)]
async fn when_search(world: &mut AppWorld, query: String) {
    dashboard::search_trips(world.app_state(), &query)
        .await
        .expect("search");
}

#[when(regex = r#"^I search from "([^"]*)" to "([^"]*)" for van "([^"]*)"$"#)]
async fn when_advanced_search(world: &mut AppWorld, start: String, end: String, van: String) {
    dashboard::advanced_search_trips(world.app_state(), &start, &end, &van)
        .await
        .expect("advanced search");
}

#[when(regex = r#"^I search by status "([^"]*)"$"#)]
async fn when_status_search(world: &mut AppWorld, raw: String) {
    dashboard::status_search_trips(world.app_state(), status(&raw))
        .await
        .expect("status search");
}

#[then(regex = r"^the table shows (\d+) trips?$")]
async fn then_table_shows(world: &mut AppWorld, count: usize) {
    assert_eq!(world.displayed().await.len(), count);
}

#[then("the dashboard is in search mode")]
async fn then_searching(world: &mut AppWorld) {
    assert!(world.app_state().trip_cache.read().await.is_searching());
}

#[then("the dashboard shows the full list")]
async fn then_not_searching(world: &mut AppWorld) {
    assert!(!world.app_state().trip_cache.read().await.is_searching());
}

#[then(regex = r"^the total rent of the table is (\d+)$")]
async fn then_table_total(world: &mut AppWorld, total: u64) {
    assert_eq!(total_rent_sum(&world.displayed().await), total);
}

#[when(
    regex = r#"^I add a trip for van "([^"]*)" on "([^"]*)" with wayment "([^"]*)", rent "([^"]*)" and misc "([^"]*)"$"#
)]
async fn when_add_trip(
    world: &mut AppWorld,
    van: String,
    date: String,
    wayment: String,
    rent: String,
    misc: String,
) {
    let draft = TripDraft {
        van_number: van,
        date,
        pickup_location: "Chennai".into(),
        dropoff_location: "Salem".into(),
        wayment,
        rent,
        misc_spending: misc,
    };
    let added = dashboard::add_trip(world.app_state(), draft).await;
    match added {
        Ok(trip) => {
            world.last_added = Some(trip);
            world.last_error = None;
        }
        Err(err) => world.last_error = Some(err.to_string()),
    }
}

#[then(regex = r"^the new trip has (\d+) bags and a total rent of (\d+)$")]
async fn then_new_trip(world: &mut AppWorld, bags: u32, total: u64) {
    let trip = world.last_added.as_ref().expect("a trip was added");
    assert_eq!(trip.no_of_bags, bags);
    assert_eq!(trip.total_rent, total);
    assert!(!trip.paid);
}

#[then(regex = r#"^the trip is rejected with "([^"]*)"$"#)]
async fn then_rejected(world: &mut AppWorld, message: String) {
    let error = world.last_error.as_ref().expect("an error was reported");
    assert!(error.contains(&message), "{error} should mention {message}");
}

#[when(regex = r#"^I change the wayment of the trip of van "([^"]*)" on "([^"]*)" to "([^"]*)"$"#)]
async fn when_edit_wayment(world: &mut AppWorld, van: String, date: String, wayment: String) {
    let trip = world.trip_of(&van, &date).await;
    let edit = TripEdit {
        wayment: Some(wayment),
        ..TripEdit::default()
    };
    dashboard::save_trip_edit(world.app_state(), &trip.id, edit)
        .await
        .expect("save edit");
}

#[then(regex = r#"^the trip of van "([^"]*)" on "([^"]*)" has (\d+) bags and a total rent of (\d+)$"#)]
async fn then_trip_of(world: &mut AppWorld, van: String, date: String, bags: u32, total: u64) {
    let trip = world.trip_of(&van, &date).await;
    assert_eq!(trip.no_of_bags, bags);
    assert_eq!(trip.total_rent, total);
}

#[when(regex = r#"^I delete the trip of van "([^"]*)" on "([^"]*)"$"#)]
async fn when_delete(world: &mut AppWorld, van: String, date: String) {
    let trip = world.trip_of(&van, &date).await;
    dashboard::delete_trip(world.app_state(), &trip.id)
        .await
        .expect("delete trip");
}

#[when(regex = r#"^I record a payment of "([^"]*)" for van "([^"]*)" from "([^"]*)" to "([^"]*)"$"#)]
async fn when_record_payment(
    world: &mut AppWorld,
    amount: String,
    van: String,
    start: String,
    end: String,
) {
    let draft = PaymentDraft {
        van_number: van,
        start_date: start,
        end_date: end,
        amount,
        transaction_date: String::new(),
    };
    let recorded = dashboard::record_payment(world.app_state(), draft, day("2024-03-01"))
        .await
        .expect("record payment");
    assert!(recorded.trips_marked);
}

#[then(regex = r"^(\d+) payments? (?:is|are) recorded$")]
async fn then_payments(world: &mut AppWorld, count: usize) {
    let cache = world.app_state().payment_cache.read().await;
    assert_eq!(cache.all().len(), count);
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
