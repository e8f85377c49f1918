//! Subcommands and their dispatch onto the subscriber store.

use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use feeder_core::{
  SubscriberStore,
  persistence::Persistence,
  subscriber::{SubscriberFields, SubscriberRecord},
};

use crate::ui::{self, Output};

// ─── Commands ─────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Register a new subscriber and print the assigned number.
  Register(FieldArgs),

  /// Show one subscriber by number (case-insensitive).
  Find { id: String },

  /// Switch a subscriber's power on or off.
  Toggle { id: String },

  /// Change a subscriber's details. Omitted flags keep their current value.
  Edit {
    id: String,
    #[command(flatten)]
    changes: EditArgs,
  },

  /// Remove the damage note from a subscriber.
  ClearDamage { id: String },

  /// Delete a subscriber.
  Delete { id: String },

  /// Record damage on every subscriber whose address contains ADDRESS.
  Damage {
    address: String,
    /// Description of the fault.
    #[arg(short, long, default_value = "")]
    text: String,
  },

  /// List subscribers, most recently changed first.
  List {
    /// Only subscribers whose address contains this text.
    #[arg(short, long)]
    address: Option<String>,
  },
}

/// All five details, required for registration.
#[derive(Args, Debug)]
pub struct FieldArgs {
  #[arg(long)]
  first_name:  String,
  #[arg(long)]
  last_name:   String,
  #[arg(long)]
  personal_id: String,
  #[arg(long)]
  phone:       String,
  #[arg(long)]
  address:     String,
}

impl From<FieldArgs> for SubscriberFields {
  fn from(a: FieldArgs) -> Self {
    Self {
      first_name:  a.first_name,
      last_name:   a.last_name,
      personal_id: a.personal_id,
      phone:       a.phone,
      address:     a.address,
    }
  }
}

/// Optional replacements for an edit.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
  #[arg(long)]
  first_name:  Option<String>,
  #[arg(long)]
  last_name:   Option<String>,
  #[arg(long)]
  personal_id: Option<String>,
  #[arg(long)]
  phone:       Option<String>,
  #[arg(long)]
  address:     Option<String>,
}

impl EditArgs {
  /// Overlay the given flags on `current`.
  pub fn apply(self, current: SubscriberFields) -> SubscriberFields {
    SubscriberFields {
      first_name:  self.first_name.unwrap_or(current.first_name),
      last_name:   self.last_name.unwrap_or(current.last_name),
      personal_id: self.personal_id.unwrap_or(current.personal_id),
      phone:       self.phone.unwrap_or(current.phone),
      address:     self.address.unwrap_or(current.address),
    }
  }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Run `command` against `store`, printing results in `output` form.
///
/// A missing subscriber is reported on stderr with exit status 1.
pub fn run<P: Persistence>(
  store: &mut SubscriberStore<P>,
  command: Command,
  output: Output,
) -> Result<ExitCode> {
  match command {
    Command::Register(args) => {
      let record = store.register(args.into())?;
      ui::print_record(&record, output)?;
      Ok(ExitCode::SUCCESS)
    }

    Command::Find { id } => {
      if id.trim().is_empty() {
        bail!("subscriber number must not be empty");
      }
      let found = store.find_by_identifier(&id).cloned();
      report(found, &id, output)
    }

    Command::Toggle { id } => report(store.toggle_power(&id)?, &id, output),

    Command::Edit { id, changes } => {
      let Some(current) = store.find_by_identifier(&id).map(SubscriberRecord::fields) else {
        return report(None, &id, output);
      };
      let updated = store.update_fields(&id, changes.apply(current))?;
      report(updated, &id, output)
    }

    Command::ClearDamage { id } => report(store.clear_damage(&id)?, &id, output),

    Command::Delete { id } => report(store.delete_by_identifier(&id)?, &id, output),

    Command::Damage { address, text } => {
      if address.trim().is_empty() {
        bail!("address must not be empty");
      }
      let count = store.bulk_set_damage(&address, &text)?;
      ui::print_damage_count(count, output)?;
      Ok(ExitCode::SUCCESS)
    }

    Command::List { address } => {
      let records = store.list(address.as_deref());
      ui::print_table(&records, output)?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

fn report(record: Option<SubscriberRecord>, id: &str, output: Output) -> Result<ExitCode> {
  match record {
    Some(r) => {
      ui::print_record(&r, output)?;
      Ok(ExitCode::SUCCESS)
    }
    None => {
      eprintln!("subscriber {} not found", id.trim());
      Ok(ExitCode::FAILURE)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn current() -> SubscriberFields {
    SubscriberFields {
      first_name:  "Ana".into(),
      last_name:   "Beridze".into(),
      personal_id: "01234".into(),
      phone:       "555".into(),
      address:     "Rustaveli 1".into(),
    }
  }

  #[test]
  fn edit_keeps_unspecified_fields() {
    let changes = EditArgs {
      phone: Some("599 000".into()),
      ..EditArgs::default()
    };
    let merged = changes.apply(current());
    assert_eq!(merged.phone, "599 000");
    assert_eq!(merged.first_name, "Ana");
    assert_eq!(merged.address, "Rustaveli 1");
  }

  #[test]
  fn edit_with_no_flags_is_identity() {
    assert_eq!(EditArgs::default().apply(current()), current());
  }
}
