//! Tests for `SqlitePersistence`, alone and underneath a `SubscriberStore`.

use std::sync::Arc;

use chrono::{TimeDelta, TimeZone as _, Utc};
use feeder_core::{
  SubscriberStore,
  clock::ManualClock,
  persistence::{Persistence, STORAGE_KEY},
  subscriber::SubscriberFields,
};
use rand_core::OsRng;
use tempfile::TempDir;

use crate::SqlitePersistence;

fn fields(first: &str, address: &str) -> SubscriberFields {
  SubscriberFields {
    first_name:  first.into(),
    last_name:   "Beridze".into(),
    personal_id: "01234".into(),
    phone:       "555".into(),
    address:     address.into(),
  }
}

// ─── Raw key/value behaviour ─────────────────────────────────────────────────

#[test]
fn fresh_database_reads_none() {
  let p = SqlitePersistence::open_in_memory().unwrap();
  assert_eq!(p.key(), STORAGE_KEY);
  assert_eq!(p.read().unwrap(), None);
}

#[test]
fn write_replaces_previous_value() {
  let mut p = SqlitePersistence::open_in_memory().unwrap();
  p.write("[1]").unwrap();
  p.write("[2]").unwrap();
  assert_eq!(p.read().unwrap().as_deref(), Some("[2]"));
}

#[test]
fn keys_are_isolated() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("feeder.db");

  let mut a = SqlitePersistence::open(&path, "a").unwrap();
  a.write("[\"a\"]").unwrap();

  let b = SqlitePersistence::open(&path, "b").unwrap();
  assert_eq!(b.read().unwrap(), None);
}

#[test]
fn open_creates_missing_directories() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("nested").join("deeper").join("feeder.db");

  let mut p = SqlitePersistence::open(&path, STORAGE_KEY).unwrap();
  p.write("[]").unwrap();
  assert!(path.exists());
}

// ─── Through the store ───────────────────────────────────────────────────────

#[test]
fn store_survives_reopen() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("feeder.db");

  let (a, b) = {
    let mut store = SubscriberStore::open(SqlitePersistence::open(&path, STORAGE_KEY).unwrap());
    let a = store.register(fields("Ana", "Rustaveli 1")).unwrap();
    let b = store.register(fields("Giorgi", "Chavchavadze 5")).unwrap();
    store.toggle_power(&b.subscriber_number).unwrap();
    assert_eq!(store.bulk_set_damage("rustaveli", "Power outage").unwrap(), 1);
    (a, b)
  };

  let store = SubscriberStore::open(SqlitePersistence::open(&path, STORAGE_KEY).unwrap());
  assert_eq!(store.records().len(), 2);

  let a = store.find_by_identifier(&a.subscriber_number).unwrap();
  assert!(a.power_on);
  assert!(a.damage_note.as_deref().unwrap().starts_with("Power outage • ("));

  let b = store.find_by_identifier(&b.subscriber_number).unwrap();
  assert!(!b.power_on);
  assert!(!b.has_damage());
}

#[test]
fn delete_is_durable() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("feeder.db");

  let id = {
    let mut store = SubscriberStore::open(SqlitePersistence::open(&path, STORAGE_KEY).unwrap());
    let rec = store.register(fields("Ana", "Rustaveli 1")).unwrap();
    store.delete_by_identifier(&rec.subscriber_number).unwrap();
    rec.subscriber_number
  };

  let store = SubscriberStore::open(SqlitePersistence::open(&path, STORAGE_KEY).unwrap());
  assert!(store.find_by_identifier(&id).is_none());
  assert!(store.records().is_empty());
}

#[test]
fn corrupt_value_opens_as_empty_store() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("feeder.db");
  SqlitePersistence::open(&path, STORAGE_KEY)
    .unwrap()
    .write("{\"truncated\": [")
    .unwrap();

  let mut store = SubscriberStore::open(SqlitePersistence::open(&path, STORAGE_KEY).unwrap());
  assert!(store.records().is_empty());

  store.register(fields("Ana", "Rustaveli 1")).unwrap();
  let reopened = SubscriberStore::open(SqlitePersistence::open(&path, STORAGE_KEY).unwrap());
  assert_eq!(reopened.records().len(), 1);
}

#[test]
fn list_order_survives_reopen() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("feeder.db");
  let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

  let expected: Vec<String> = {
    let mut store = SubscriberStore::with_parts(
      SqlitePersistence::open(&path, STORAGE_KEY).unwrap(),
      Arc::new(clock.clone()),
      Box::new(OsRng),
    );
    let a = store.register(fields("A", "Rustaveli 1")).unwrap();
    clock.advance(TimeDelta::seconds(1));
    let b = store.register(fields("B", "Rustaveli 2")).unwrap();
    clock.advance(TimeDelta::seconds(1));
    store.toggle_power(&a.subscriber_number).unwrap();
    vec![a.subscriber_number, b.subscriber_number]
  };

  let store = SubscriberStore::open(SqlitePersistence::open(&path, STORAGE_KEY).unwrap());
  let listed: Vec<String> = store
    .list(None)
    .into_iter()
    .map(|r| r.subscriber_number.clone())
    .collect();
  assert_eq!(listed, expected);
}
