//! Subscriber number generation.
//!
//! Numbers look like `SUB-20240131-4821`: a fixed prefix, the creation date,
//! and a four-digit suffix in `1000..=9999`. That leaves 9000 numbers per
//! calendar day.

use std::collections::HashSet;

use chrono::NaiveDate;
use rand_core::RngCore;

use crate::{Error, Result};

pub const PREFIX: &str = "SUB";

const SUFFIX_MIN: u32 = 1000;
const SUFFIX_COUNT: u32 = 9000;

/// Random draws before falling back to a scan of the suffix space.
const RANDOM_ATTEMPTS: usize = 64;

pub fn format_identifier(date: NaiveDate, suffix: u32) -> String {
  format!("{PREFIX}-{}-{suffix:04}", date.format("%Y%m%d"))
}

/// Pick a subscriber number for `date` that is not in `existing`.
///
/// Comparison against `existing` ignores ASCII case. Draws random suffixes a
/// bounded number of times, then walks the suffix space from a random
/// offset, so the call always terminates. Fails with [`Error::Generation`]
/// only when every suffix for the day is taken.
pub fn generate_identifier<'a, I, R>(
  existing: I,
  date: NaiveDate,
  rng: &mut R,
) -> Result<String>
where
  I: IntoIterator<Item = &'a str>,
  R: RngCore + ?Sized,
{
  let taken: HashSet<String> = existing
    .into_iter()
    .map(str::to_ascii_uppercase)
    .collect();

  for _ in 0..RANDOM_ATTEMPTS {
    let candidate = format_identifier(date, SUFFIX_MIN + random_below(rng, SUFFIX_COUNT));
    if !taken.contains(&candidate) {
      return Ok(candidate);
    }
  }

  let start = random_below(rng, SUFFIX_COUNT);
  (0..SUFFIX_COUNT)
    .map(|i| format_identifier(date, SUFFIX_MIN + (start + i) % SUFFIX_COUNT))
    .find(|candidate| !taken.contains(candidate))
    .ok_or(Error::Generation { date })
}

/// Uniform value in `0..bound` by rejection sampling.
fn random_below<R: RngCore + ?Sized>(rng: &mut R, bound: u32) -> u32 {
  let limit = (u32::MAX / bound) * bound;
  loop {
    let v = rng.next_u32();
    if v < limit {
      return v % bound;
    }
  }
}

/// Deterministic generator for tests: yields `values` in order, cycling.
#[cfg(test)]
pub(crate) struct SequenceRng {
  values: Vec<u32>,
  pos:    usize,
}

#[cfg(test)]
impl SequenceRng {
  pub(crate) fn new(values: Vec<u32>) -> Self { Self { values, pos: 0 } }

  pub(crate) fn constant(value: u32) -> Self { Self::new(vec![value]) }
}

#[cfg(test)]
impl RngCore for SequenceRng {
  fn next_u32(&mut self) -> u32 {
    let v = self.values[self.pos % self.values.len()];
    self.pos += 1;
    v
  }

  fn next_u64(&mut self) -> u64 { rand_core::impls::next_u64_via_u32(self) }

  fn fill_bytes(&mut self, dest: &mut [u8]) {
    rand_core::impls::fill_bytes_via_next(self, dest)
  }

  fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
    self.fill_bytes(dest);
    Ok(())
  }
}
