//! Time Lock Pallet
//!
//! Deposit-gated forwarding. A caller locks native tokens before its script is executed, and
//! the deposit and lock time grow with the number of the caller's locks that have not
//! matured yet. Matured locks are released through a windowed withdrawal over the caller's
//! ledger, oldest first.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod types;
pub use types::{Balance, Lock, LockParameters, Moment, PCT_BASE};

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

use frame::deps::{frame_support::weights::Weight, sp_runtime::DispatchResult};

pub(crate) const LOG_TARGET: &str = "runtime::time-lock";

/// Runs the action a caller paid the deposit for.
pub trait ForwardScript<AccountId> {
  /// Execute `script` on behalf of `who`. An error reverts the whole forward.
  fn execute(who: &AccountId, script: &[u8]) -> DispatchResult;

  /// Upper bound on the execution weight of a script of `script_len` bytes.
  fn weight(_script_len: u32) -> Weight {
    Weight::zero()
  }
}

impl<AccountId> ForwardScript<AccountId> for () {
  fn execute(_who: &AccountId, _script: &[u8]) -> DispatchResult {
    Ok(())
  }
}

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper {
  /// Move the maturity clock to `now`.
  fn set_time(now: Moment);
}

#[frame::pallet]
pub mod pallet {
  use super::*;
  use alloc::vec::Vec;
  use frame::deps::{
    frame_support::{
      PalletId,
      storage::with_storage_layer,
      traits::{
        Time,
        fungible::{Inspect, Mutate},
        tokens::Preservation,
      },
    },
    sp_runtime::traits::{AccountIdConversion, SaturatedConversion},
  };
  use frame::prelude::*;

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Currency the deposits are taken in
    type Currency: Inspect<Self::AccountId, Balance = Balance>
      + Mutate<Self::AccountId, Balance = Balance>;

    /// Clock used for maturity checks
    type Time: Time<Moment = Moment>;

    /// Origin allowed to forward a script, resolving to the depositing account
    type ForwardOrigin: EnsureOrigin<Self::RuntimeOrigin, Success = Self::AccountId>;

    /// Origin that can change the base lock duration
    type LockDurationOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Origin that can change the base lock amount
    type LockAmountOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Origin that can change the spam penalty factor
    type SpamPenaltyOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Executor of forwarded scripts
    type ScriptExecutor: ForwardScript<Self::AccountId>;

    /// Pallet ID deriving the custody account
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Maximum number of locks a single account can hold
    #[pallet::constant]
    type MaxLocks: Get<u32>;

    /// Maximum length of a forwarded script
    #[pallet::constant]
    type MaxScriptLength: Get<u32>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  pub type ScriptOf<T> = BoundedVec<u8, <T as Config>::MaxScriptLength>;
  pub type LedgerOf<T> = BoundedVec<Lock, <T as Config>::MaxLocks>;

  /// Base lock time added to every new lock
  #[pallet::storage]
  pub type LockDuration<T: Config> = StorageValue<_, Moment, ValueQuery>;

  /// Base deposit charged by every forward
  #[pallet::storage]
  pub type LockAmount<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Penalty per active lock, scaled by `PCT_BASE`
  #[pallet::storage]
  pub type SpamPenaltyFactor<T: Config> = StorageValue<_, u128, ValueQuery>;

  /// Locks of every account, oldest first
  #[pallet::storage]
  pub type Ledgers<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, LedgerOf<T>, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Base lock duration updated
    LockDurationChanged { lock_duration: Moment },
    /// Base lock amount updated
    LockAmountChanged { lock_amount: Balance },
    /// Spam penalty factor updated
    SpamPenaltyFactorChanged { spam_penalty_factor: u128 },
    /// A deposit was locked ahead of a forwarded script
    NewLock {
      who: T::AccountId,
      unlock_time: Moment,
      amount: Balance,
    },
    /// Matured locks were released back to their owner
    Withdrawal {
      who: T::AccountId,
      released_count: u32,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Arithmetic overflow occurred
    Overflow,
    /// Requested more locks than the ledger holds
    InvalidWithdrawCount,
    /// The currency refused to move the funds
    TransferFailed,
    /// The account already holds the maximum number of locks
    TooManyLocks,
    /// A non-zero deposit would be below the currency's existential deposit
    DepositBelowMinimum,
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(T::MaxLocks::get() > 0, "MaxLocks must be greater than zero");
    }

    #[cfg(feature = "try-runtime")]
    fn try_state(_n: BlockNumberFor<T>) -> Result<(), frame::deps::sp_runtime::TryRuntimeError> {
      Self::do_try_state()
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Lock the current deposit and run `script` on behalf of the caller.
    ///
    /// The deposit is the base lock amount plus the spam penalty of the caller's ledger
    /// as it stands before this lock is appended.
    #[pallet::call_index(0)]
    #[pallet::weight(
      T::WeightInfo::forward(T::MaxLocks::get())
        .saturating_add(T::ScriptExecutor::weight(script.len() as u32))
    )]
    pub fn forward(origin: OriginFor<T>, script: ScriptOf<T>) -> DispatchResultWithPostInfo {
      let who = T::ForwardOrigin::ensure_origin(origin)?;
      let existing = Self::ledger_length(&who);
      Self::do_forward(&who, &script)?;
      let actual = T::WeightInfo::forward(existing)
        .saturating_add(T::ScriptExecutor::weight(script.len() as u32));
      Ok(Some(actual).into())
    }

    /// Release the matured locks among the caller's `count` oldest locks.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::withdraw(T::MaxLocks::get()))]
    pub fn withdraw(origin: OriginFor<T>, count: u32) -> DispatchResultWithPostInfo {
      let who = ensure_signed(origin)?;
      Self::do_withdraw(&who, count)?;
      Ok(Some(T::WeightInfo::withdraw(count)).into())
    }

    /// Release every matured lock of the caller.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::withdraw(T::MaxLocks::get()))]
    pub fn withdraw_all(origin: OriginFor<T>) -> DispatchResultWithPostInfo {
      let who = ensure_signed(origin)?;
      let count = Self::ledger_length(&who);
      Self::do_withdraw(&who, count)?;
      Ok(Some(T::WeightInfo::withdraw(count)).into())
    }

    /// Update the base lock duration (governance only)
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::set_lock_duration())]
    pub fn set_lock_duration(origin: OriginFor<T>, lock_duration: Moment) -> DispatchResult {
      T::LockDurationOrigin::ensure_origin(origin)?;
      LockDuration::<T>::put(lock_duration);
      Self::deposit_event(Event::LockDurationChanged { lock_duration });
      Ok(())
    }

    /// Update the base lock amount (governance only)
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::set_lock_amount())]
    pub fn set_lock_amount(origin: OriginFor<T>, lock_amount: Balance) -> DispatchResult {
      T::LockAmountOrigin::ensure_origin(origin)?;
      LockAmount::<T>::put(lock_amount);
      Self::deposit_event(Event::LockAmountChanged { lock_amount });
      Ok(())
    }

    /// Update the spam penalty factor (governance only)
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::set_spam_penalty_factor())]
    pub fn set_spam_penalty_factor(
      origin: OriginFor<T>,
      spam_penalty_factor: u128,
    ) -> DispatchResult {
      T::SpamPenaltyOrigin::ensure_origin(origin)?;
      SpamPenaltyFactor::<T>::put(spam_penalty_factor);
      Self::deposit_event(Event::SpamPenaltyFactorChanged {
        spam_penalty_factor,
      });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Custody account holding every outstanding deposit
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Current base duration, base amount and penalty factor
    pub fn lock_parameters() -> LockParameters {
      LockParameters {
        lock_duration: LockDuration::<T>::get(),
        lock_amount: LockAmount::<T>::get(),
        spam_penalty_factor: SpamPenaltyFactor::<T>::get(),
      }
    }

    /// Locks of `who`, oldest first
    pub fn locks(who: &T::AccountId) -> Vec<Lock> {
      Ledgers::<T>::get(who).into_inner()
    }

    /// Number of locks of `who`, matured or not
    pub fn ledger_length(who: &T::AccountId) -> u32 {
      Ledgers::<T>::decode_len(who)
        .unwrap_or_default()
        .saturated_into()
    }

    /// Number of locks of `who` that have not matured yet
    pub fn active_lock_count(who: &T::AccountId) -> u32 {
      Self::count_active(&Ledgers::<T>::get(who), T::Time::now())
    }

    /// Amount and duration surcharge the next forward of `who` would pay
    pub fn spam_penalty(who: &T::AccountId) -> Result<(Balance, Moment), DispatchError> {
      let active = Self::active_lock_count(who);
      Self::lock_parameters()
        .spam_penalty(active)
        .ok_or_else(|| Error::<T>::Overflow.into())
    }

    /// Deposit and unlock time the next forward of `who` would produce
    pub fn forward_cost(who: &T::AccountId) -> Result<(Balance, Moment), DispatchError> {
      let lock = Self::next_lock(&Ledgers::<T>::get(who), T::Time::now())?;
      Ok((lock.amount, lock.unlock_time))
    }

    /// Create a lock for `who` and run `script`.
    ///
    /// Every effect happens inside one storage layer, so a failed transfer or a reverting
    /// script leaves the ledger and balances untouched.
    pub fn do_forward(who: &T::AccountId, script: &[u8]) -> Result<Lock, DispatchError> {
      with_storage_layer(|| {
        let now = T::Time::now();
        let lock = Ledgers::<T>::try_mutate(who, |ledger| -> Result<Lock, DispatchError> {
          let lock = Self::next_lock(ledger.as_slice(), now)?;
          // Custody can only hold balances the currency does not reap as dust
          ensure!(
            lock.amount == 0 || lock.amount >= T::Currency::minimum_balance(),
            Error::<T>::DepositBelowMinimum
          );
          ledger
            .try_push(lock)
            .map_err(|_| Error::<T>::TooManyLocks)?;
          Ok(lock)
        })?;
        let Lock {
          unlock_time,
          amount,
        } = lock;
        if amount > 0 {
          T::Currency::transfer(who, &Self::account_id(), amount, Preservation::Expendable)
            .map_err(|e| {
              log::debug!(
                target: LOG_TARGET,
                "deposit of {amount} from {who:?} refused: {e:?}"
              );
              Error::<T>::TransferFailed
            })?;
        }
        Self::deposit_event(Event::NewLock {
          who: who.clone(),
          unlock_time,
          amount,
        });
        log::debug!(
          target: LOG_TARGET,
          "locked {amount} for {who:?} until {unlock_time}"
        );
        T::ScriptExecutor::execute(who, script)?;
        Ok(lock)
      })
    }

    /// Release matured locks among the `count` oldest locks of `who`.
    ///
    /// Locks inside the window that have not matured keep their relative order at the front
    /// of the ledger, ahead of the locks outside the window. Returns the number of released
    /// locks.
    pub fn do_withdraw(who: &T::AccountId, count: u32) -> Result<u32, DispatchError> {
      with_storage_layer(|| {
        let ledger = Ledgers::<T>::get(who);
        let window = count as usize;
        ensure!(window <= ledger.len(), Error::<T>::InvalidWithdrawCount);

        let now = T::Time::now();
        let (candidates, untouched) = ledger.split_at(window);
        let mut retained = Vec::with_capacity(ledger.len());
        let mut amount_owed: Balance = 0;
        let mut released: u32 = 0;
        for lock in candidates {
          if lock.is_unlocked(now) {
            amount_owed = amount_owed
              .checked_add(lock.amount)
              .ok_or(Error::<T>::Overflow)?;
            released = released.saturating_add(1);
          } else {
            retained.push(*lock);
          }
        }

        if released > 0 {
          retained.extend_from_slice(untouched);
          if retained.is_empty() {
            Ledgers::<T>::remove(who);
          } else {
            Ledgers::<T>::insert(who, LedgerOf::<T>::truncate_from(retained));
          }
        }

        if amount_owed > 0 {
          T::Currency::transfer(
            &Self::account_id(),
            who,
            amount_owed,
            Preservation::Expendable,
          )
          .map_err(|e| {
            log::warn!(
              target: LOG_TARGET,
              "release of {amount_owed} to {who:?} refused: {e:?}"
            );
            Error::<T>::TransferFailed
          })?;
        }

        Self::deposit_event(Event::Withdrawal {
          who: who.clone(),
          released_count: released,
        });
        log::debug!(
          target: LOG_TARGET,
          "released {released} of {count} requested locks for {who:?}, paid {amount_owed}"
        );
        Ok(released)
      })
    }

    /// Lock a forward by the owner of `ledger` would append at `now`.
    fn next_lock(ledger: &[Lock], now: Moment) -> Result<Lock, DispatchError> {
      let (amount, duration) = Self::lock_parameters()
        .lock_terms(Self::count_active(ledger, now))
        .ok_or(Error::<T>::Overflow)?;
      let unlock_time = now.checked_add(duration).ok_or(Error::<T>::Overflow)?;
      Ok(Lock {
        unlock_time,
        amount,
      })
    }

    fn count_active(ledger: &[Lock], now: Moment) -> u32 {
      ledger
        .iter()
        .filter(|lock| lock.is_active(now))
        .count()
        .saturated_into()
    }

    /// Custody must hold exactly the sum of all outstanding locks.
    #[cfg(any(feature = "try-runtime", test))]
    pub fn do_try_state() -> Result<(), DispatchError> {
      let mut outstanding: Balance = 0;
      for (_, ledger) in Ledgers::<T>::iter() {
        ensure!(
          !ledger.is_empty(),
          DispatchError::Other("empty ledger kept in storage")
        );
        for lock in ledger.iter() {
          outstanding = outstanding
            .checked_add(lock.amount)
            .ok_or(Error::<T>::Overflow)?;
        }
      }
      ensure!(
        T::Currency::balance(&Self::account_id()) == outstanding,
        DispatchError::Other("custody balance differs from outstanding locks")
      );
      Ok(())
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub lock_duration: Moment,
    pub lock_amount: Balance,
    pub spam_penalty_factor: u128,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      LockDuration::<T>::put(self.lock_duration);
      LockAmount::<T>::put(self.lock_amount);
      SpamPenaltyFactor::<T>::put(self.spam_penalty_factor);
      // Custody account survives a zero balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
