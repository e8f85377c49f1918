//! Subscriber records — the only entity the store manages.
//!
//! A record is created by [`crate::store::SubscriberStore::register`] and is
//! identified for its whole life by an immutable subscriber number. Every
//! other attribute except `created_at` may change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::{Error, Result};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The five editable, required attributes of a subscriber.
///
/// Displays as the persisted (camelCase) attribute name.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
  FirstName,
  LastName,
  PersonalId,
  Phone,
  Address,
}

/// Input to `register` and `update_fields`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberFields {
  pub first_name:  String,
  pub last_name:   String,
  pub personal_id: String,
  pub phone:       String,
  pub address:     String,
}

impl SubscriberFields {
  pub fn get(&self, field: Field) -> &str {
    match field {
      Field::FirstName => &self.first_name,
      Field::LastName => &self.last_name,
      Field::PersonalId => &self.personal_id,
      Field::Phone => &self.phone,
      Field::Address => &self.address,
    }
  }

  /// Return a trimmed copy, or [`Error::Validation`] naming every field that
  /// is empty once trimmed.
  pub fn validate(&self) -> Result<Self> {
    let missing: Vec<Field> = Field::iter()
      .filter(|f| self.get(*f).trim().is_empty())
      .collect();
    if !missing.is_empty() {
      return Err(Error::Validation { missing });
    }

    Ok(Self {
      first_name:  self.first_name.trim().to_owned(),
      last_name:   self.last_name.trim().to_owned(),
      personal_id: self.personal_id.trim().to_owned(),
      phone:       self.phone.trim().to_owned(),
      address:     self.address.trim().to_owned(),
    })
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One subscriber as held in memory and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberRecord {
  /// `SUB-YYYYMMDD-XXXX`; never changes after creation.
  pub subscriber_number: String,
  pub first_name:        String,
  pub last_name:         String,
  pub personal_id:       String,
  pub phone:             String,
  pub address:           String,
  pub power_on:          bool,
  /// `None` means no fault is recorded.
  pub damage_note:       Option<String>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl SubscriberRecord {
  /// A freshly registered record: power on, no fault note.
  pub(crate) fn new(
    subscriber_number: String,
    fields: SubscriberFields,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      subscriber_number,
      first_name: fields.first_name,
      last_name: fields.last_name,
      personal_id: fields.personal_id,
      phone: fields.phone,
      address: fields.address,
      power_on: true,
      damage_note: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name) }

  pub fn has_damage(&self) -> bool { self.damage_note.is_some() }

  /// The editable attributes, e.g. to prefill an edit.
  pub fn fields(&self) -> SubscriberFields {
    SubscriberFields {
      first_name:  self.first_name.clone(),
      last_name:   self.last_name.clone(),
      personal_id: self.personal_id.clone(),
      phone:       self.phone.clone(),
      address:     self.address.clone(),
    }
  }

  pub(crate) fn apply_fields(&mut self, fields: SubscriberFields) {
    self.first_name = fields.first_name;
    self.last_name = fields.last_name;
    self.personal_id = fields.personal_id;
    self.phone = fields.phone;
    self.address = fields.address;
  }

  /// Refresh `updated_at`, never letting it fall behind `created_at`.
  pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = now.max(self.created_at);
  }

  /// Case-insensitive substring match on the address. `needle` must already
  /// be lowercased.
  pub(crate) fn address_contains(&self, needle: &str) -> bool {
    self.address.trim().to_lowercase().contains(needle)
  }
}
