//! [`SubscriberStore`] — the in-memory subscriber collection and its
//! operations.
//!
//! The store is loaded once from a [`Persistence`] backend and written back
//! in full after every mutation. Reads (`find_by_identifier`, `list`) never
//! write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};

use crate::{
  Error, Result,
  clock::{Clock, SystemClock},
  identifier::generate_identifier,
  persistence::{Persistence, decode_snapshot, encode_snapshot},
  subscriber::{SubscriberFields, SubscriberRecord},
};

/// Note text used by [`SubscriberStore::bulk_set_damage`] when none is given.
pub const DEFAULT_DAMAGE_TEXT: &str = "Damage reported";

// ─── Load / save ─────────────────────────────────────────────────────────────

/// Read the stored collection. Never fails: a backend read error or
/// unreadable data yields an empty collection.
pub fn load<P: Persistence>(persistence: &P) -> Vec<SubscriberRecord> {
  match persistence.read() {
    Ok(raw) => decode_snapshot(raw.as_deref()),
    Err(e) => {
      tracing::warn!(error = %e, "could not read stored subscribers; starting empty");
      Vec::new()
    }
  }
}

/// Serialize `records` and replace whatever the backend held.
pub fn save<P: Persistence>(persistence: &mut P, records: &[SubscriberRecord]) -> Result<()> {
  let snapshot = encode_snapshot(records)?;
  persistence
    .write(&snapshot)
    .map_err(|e| Error::PersistenceWrite(Box::new(e)))
}

/// `"<text> • (<timestamp>)"`, falling back to [`DEFAULT_DAMAGE_TEXT`].
pub fn format_damage_note(text: &str, at: DateTime<Utc>) -> String {
  let text = match text.trim() {
    "" => DEFAULT_DAMAGE_TEXT,
    t => t,
  };
  format!("{text} • ({})", at.format("%Y-%m-%d %H:%M:%S UTC"))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The subscriber collection plus the ports it depends on.
///
/// Single-writer by construction: every mutating method takes `&mut self`
/// and persists before returning.
pub struct SubscriberStore<P> {
  persistence: P,
  records:     Vec<SubscriberRecord>,
  clock:       Arc<dyn Clock>,
  rng:         Box<dyn RngCore + Send>,
}

impl<P: Persistence> SubscriberStore<P> {
  /// Load from `persistence` using the system clock and OS randomness.
  pub fn open(persistence: P) -> Self {
    Self::with_parts(persistence, Arc::new(SystemClock), Box::new(OsRng))
  }

  /// Load from `persistence` with explicit clock and random source.
  pub fn with_parts(
    persistence: P,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
  ) -> Self {
    let records = load(&persistence);
    tracing::debug!(count = records.len(), "loaded subscribers");
    Self { persistence, records, clock, rng }
  }

  pub fn records(&self) -> &[SubscriberRecord] { &self.records }

  pub fn persistence(&self) -> &P { &self.persistence }

  pub fn into_persistence(self) -> P { self.persistence }

  /// Write the full collection to the backend.
  pub fn save(&mut self) -> Result<()> { save(&mut self.persistence, &self.records) }

  fn position(&self, id: &str) -> Option<usize> {
    let query = id.trim().to_lowercase();
    if query.is_empty() {
      return None;
    }
    self
      .records
      .iter()
      .position(|r| r.subscriber_number.to_lowercase() == query)
  }

  // ── Create ────────────────────────────────────────────────────────────────

  /// Validate `fields`, assign a fresh subscriber number, append and persist.
  ///
  /// On a validation or generation error nothing is appended or written.
  pub fn register(&mut self, fields: SubscriberFields) -> Result<SubscriberRecord> {
    let fields = fields.validate()?;
    let now = self.clock.now();
    let subscriber_number = generate_identifier(
      self.records.iter().map(|r| r.subscriber_number.as_str()),
      now.date_naive(),
      self.rng.as_mut(),
    )?;

    let record = SubscriberRecord::new(subscriber_number, fields, now);
    self.records.push(record.clone());
    self.save()?;

    tracing::info!(subscriber = %record.subscriber_number, "registered subscriber");
    Ok(record)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Case-insensitive exact match on the subscriber number. A blank query
  /// matches nothing.
  pub fn find_by_identifier(&self, id: &str) -> Option<&SubscriberRecord> {
    let found = self.position(id).map(|i| &self.records[i]);
    tracing::debug!(query = id, found = found.is_some(), "subscriber lookup");
    found
  }

  /// All records, or those whose address contains `address_filter`
  /// (case-insensitive), most recently updated first.
  pub fn list(&self, address_filter: Option<&str>) -> Vec<&SubscriberRecord> {
    let needle = address_filter
      .map(|f| f.trim().to_lowercase())
      .unwrap_or_default();

    let mut out: Vec<&SubscriberRecord> = self
      .records
      .iter()
      .filter(|r| needle.is_empty() || r.address_contains(&needle))
      .collect();
    out.sort_by(|a, b| {
      b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| a.subscriber_number.cmp(&b.subscriber_number))
    });
    out
  }

  // ── Single-record mutations ───────────────────────────────────────────────

  /// Apply `f` to the record for `id`, refresh `updated_at` and persist.
  /// `Ok(None)` if no record matches; nothing is written then.
  fn mutate(
    &mut self,
    id: &str,
    f: impl FnOnce(&mut SubscriberRecord),
  ) -> Result<Option<SubscriberRecord>> {
    let Some(i) = self.position(id) else {
      tracing::debug!(query = id, "no subscriber to update");
      return Ok(None);
    };

    let now = self.clock.now();
    let record = &mut self.records[i];
    f(record);
    record.touch(now);
    let updated = record.clone();

    self.save()?;
    Ok(Some(updated))
  }

  /// Flip `power_on`.
  pub fn toggle_power(&mut self, id: &str) -> Result<Option<SubscriberRecord>> {
    let updated = self.mutate(id, |r| r.power_on = !r.power_on)?;
    if let Some(r) = &updated {
      tracing::info!(subscriber = %r.subscriber_number, power_on = r.power_on, "toggled power");
    }
    Ok(updated)
  }

  /// Overwrite the five editable fields (trimmed). Validation matches
  /// [`Self::register`] and runs before the lookup.
  pub fn update_fields(
    &mut self,
    id: &str,
    fields: SubscriberFields,
  ) -> Result<Option<SubscriberRecord>> {
    let fields = fields.validate()?;
    let updated = self.mutate(id, |r| r.apply_fields(fields))?;
    if let Some(r) = &updated {
      tracing::info!(subscriber = %r.subscriber_number, "updated subscriber details");
    }
    Ok(updated)
  }

  pub fn clear_damage(&mut self, id: &str) -> Result<Option<SubscriberRecord>> {
    let updated = self.mutate(id, |r| r.damage_note = None)?;
    if let Some(r) = &updated {
      tracing::info!(subscriber = %r.subscriber_number, "cleared damage note");
    }
    Ok(updated)
  }

  /// Remove the record for `id` and return it. `Ok(None)` and no write if
  /// absent.
  pub fn delete_by_identifier(&mut self, id: &str) -> Result<Option<SubscriberRecord>> {
    let Some(i) = self.position(id) else {
      tracing::debug!(query = id, "no subscriber to delete");
      return Ok(None);
    };

    let removed = self.records.remove(i);
    self.save()?;

    tracing::info!(subscriber = %removed.subscriber_number, "deleted subscriber");
    Ok(Some(removed))
  }

  // ── Bulk mutation ─────────────────────────────────────────────────────────

  /// Set a damage note on every record whose address contains
  /// `address_substring` (case-insensitive) and persist once.
  ///
  /// Returns the number of records changed; zero matches is not an error. A
  /// blank address is a no-op and writes nothing.
  pub fn bulk_set_damage(&mut self, address_substring: &str, text: &str) -> Result<usize> {
    let needle = address_substring.trim().to_lowercase();
    if needle.is_empty() {
      tracing::debug!("blank address; bulk damage skipped");
      return Ok(0);
    }

    let now = self.clock.now();
    let note = format_damage_note(text, now);
    let mut count = 0;
    for record in self.records.iter_mut().filter(|r| r.address_contains(&needle)) {
      record.damage_note = Some(note.clone());
      record.touch(now);
      count += 1;
    }

    self.save()?;
    tracing::info!(address = %needle, count, "recorded damage by address");
    Ok(count)
  }
}
