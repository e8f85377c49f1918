//! Plain-text and JSON rendering of subscriber records.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use feeder_core::subscriber::SubscriberRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
  Text,
  Json,
}

pub fn power_label(on: bool) -> &'static str { if on { "on" } else { "off" } }

fn local(at: DateTime<Utc>) -> String {
  at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

// ─── Card ─────────────────────────────────────────────────────────────────────

/// Multi-line detail view of one subscriber.
pub fn card(r: &SubscriberRecord) -> String {
  let mut s = String::new();
  let _ = writeln!(s, "Subscriber   {}", r.subscriber_number);
  let _ = writeln!(s, "Name         {}", r.full_name());
  let _ = writeln!(s, "Personal ID  {}", r.personal_id);
  let _ = writeln!(s, "Phone        {}", r.phone);
  let _ = writeln!(s, "Address      {}", r.address);
  let _ = writeln!(s, "Power        {}", power_label(r.power_on));
  let _ = writeln!(
    s,
    "Damage       {}",
    r.damage_note.as_deref().unwrap_or("nothing recorded")
  );
  let _ = writeln!(s, "Registered   {}", local(r.created_at));
  let _ = write!(s, "Updated      {}", local(r.updated_at));
  s
}

// ─── Table ────────────────────────────────────────────────────────────────────

/// One row per subscriber, columns padded to the widest value.
pub fn table(records: &[&SubscriberRecord]) -> String {
  let header = ["NUMBER", "NAME", "ADDRESS", "POWER", "DAMAGE"];
  let rows: Vec<[String; 5]> = records
    .iter()
    .map(|r| {
      [
        r.subscriber_number.clone(),
        r.full_name(),
        r.address.clone(),
        power_label(r.power_on).to_owned(),
        if r.has_damage() { "reported".to_owned() } else { "-".to_owned() },
      ]
    })
    .collect();

  let mut widths = header.map(str::len);
  for row in &rows {
    for (w, cell) in widths.iter_mut().zip(row) {
      *w = (*w).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  let mut push_row = |cells: [&str; 5]| {
    let line: Vec<String> = cells
      .iter()
      .zip(widths)
      .map(|(c, w)| format!("{c:<w$}"))
      .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
  };
  push_row(header);
  for row in &rows {
    push_row(row.each_ref().map(String::as_str));
  }
  out
}

// ─── Printing ─────────────────────────────────────────────────────────────────

pub fn print_record(r: &SubscriberRecord, output: Output) -> Result<()> {
  match output {
    Output::Text => println!("{}", card(r)),
    Output::Json => println!("{}", serde_json::to_string_pretty(r)?),
  }
  Ok(())
}

pub fn print_table(records: &[&SubscriberRecord], output: Output) -> Result<()> {
  match output {
    Output::Text if records.is_empty() => println!("no subscribers"),
    Output::Text => print!("{}", table(records)),
    Output::Json => println!("{}", serde_json::to_string_pretty(records)?),
  }
  Ok(())
}

pub fn print_damage_count(count: usize, output: Output) -> Result<()> {
  match output {
    Output::Text if count == 0 => println!("no subscribers at that address"),
    Output::Text => println!("damage recorded for {count} subscriber(s)"),
    Output::Json => println!("{}", serde_json::json!({ "affected": count })),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  fn record(number: &str, address: &str, damage: Option<&str>) -> SubscriberRecord {
    let at = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
    SubscriberRecord {
      subscriber_number: number.into(),
      first_name:        "Ana".into(),
      last_name:         "Beridze".into(),
      personal_id:       "01234".into(),
      phone:             "555".into(),
      address:           address.into(),
      power_on:          true,
      damage_note:       damage.map(Into::into),
      created_at:        at,
      updated_at:        at,
    }
  }

  #[test]
  fn card_shows_fault_fallback() {
    let text = card(&record("SUB-20240131-1234", "Rustaveli 1", None));
    assert!(text.contains("Damage       nothing recorded"));
    assert!(text.contains("Power        on"));
  }

  #[test]
  fn table_aligns_columns() {
    let a = record("SUB-20240131-1234", "Rustaveli 1", Some("Storm"));
    let b = record("SUB-20240131-5678", "Chavchavadze 5, Vake", None);
    let out = table(&[&a, &b]);
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("NUMBER"));
    let power_col = lines[0].find("POWER").unwrap();
    assert_eq!(&lines[1][power_col..power_col + 2], "on");
    assert_eq!(&lines[2][power_col..power_col + 2], "on");
    assert!(lines[1].ends_with("reported"));
    assert!(lines[2].ends_with('-'));
  }
}
