use frame::deps::sp_core::U256;
use frame::prelude::*;

/// Balance type of the deposit currency
pub type Balance = u128;

/// Timestamp type of the maturity clock
pub type Moment = u64;

/// Fixed-point base of the spam penalty factor, `PCT_BASE` equals 100%
pub const PCT_BASE: u128 = 1_000_000_000_000_000_000;

/// A deposit held in custody until it matures.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct Lock {
  /// Instant after which the deposit becomes withdrawable
  pub unlock_time: Moment,
  /// Amount moved into custody when the lock was created
  pub amount: Balance,
}

impl Lock {
  /// Still counts towards the owner's spam penalty.
  pub fn is_active(&self, now: Moment) -> bool {
    self.unlock_time > now
  }

  /// Maturity has strictly passed, the deposit can be released.
  pub fn is_unlocked(&self, now: Moment) -> bool {
    now > self.unlock_time
  }
}

/// Global lock parameters, read by every forward and penalty query.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LockParameters {
  /// Base lock time
  pub lock_duration: Moment,
  /// Base deposit
  pub lock_amount: Balance,
  /// Penalty per active lock, scaled by `PCT_BASE`
  pub spam_penalty_factor: u128,
}

impl LockParameters {
  /// Surcharge applied to a caller holding `active_locks` unmatured locks.
  ///
  /// Both products are taken in 256 bits before the truncating division by `PCT_BASE`.
  /// Returns `None` when the amount exceeds `Balance` or the duration exceeds `Moment`.
  pub fn spam_penalty(&self, active_locks: u32) -> Option<(Balance, Moment)> {
    let amount = scale_by_penalty(
      U256::from(self.lock_amount),
      active_locks,
      self.spam_penalty_factor,
    )?;
    let duration = scale_by_penalty(
      U256::from(self.lock_duration),
      active_locks,
      self.spam_penalty_factor,
    )?;
    if amount > U256::from(Balance::MAX) || duration > U256::from(Moment::MAX) {
      return None;
    }
    Some((amount.as_u128(), duration.as_u64()))
  }

  /// Total deposit and lock time charged to a caller holding `active_locks` unmatured locks.
  pub fn lock_terms(&self, active_locks: u32) -> Option<(Balance, Moment)> {
    let (penalty_amount, penalty_duration) = self.spam_penalty(active_locks)?;
    let amount = self.lock_amount.checked_add(penalty_amount)?;
    let duration = self.lock_duration.checked_add(penalty_duration)?;
    Some((amount, duration))
  }
}

fn scale_by_penalty(base: U256, active_locks: u32, factor: u128) -> Option<U256> {
  base
    .checked_mul(U256::from(active_locks))?
    .checked_mul(U256::from(factor))?
    .checked_div(U256::from(PCT_BASE))
}
