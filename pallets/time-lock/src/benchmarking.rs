#![cfg(feature = "runtime-benchmarks")]

extern crate alloc;

use super::*;
use alloc::vec;
use frame::deps::frame_support::traits::{
  EnsureOrigin,
  fungible::{Inspect, Mutate},
};
use frame::prelude::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;

const BENCH_TIME: Moment = 1_000_000;
const FUNDING: Balance = 1_000_000_000_000_000;
const DEPOSIT: Balance = FUNDING / 1_000;

fn forward_caller<T: Config>() -> Result<(T::RuntimeOrigin, T::AccountId), BenchmarkError> {
  let origin = T::ForwardOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;
  let who = T::ForwardOrigin::ensure_origin(origin.clone()).map_err(|_| BenchmarkError::Weightless)?;
  T::Currency::set_balance(&who, FUNDING);
  Ok((origin, who))
}

/// Fill the ledger of `who` with `n` locks unlocking at `unlock_time` and back them in custody.
fn prefill_ledger<T: Config>(who: &T::AccountId, n: u32, unlock_time: Moment) {
  let locks = vec![
    Lock {
      unlock_time,
      amount: DEPOSIT,
    };
    n as usize
  ];
  Ledgers::<T>::insert(who, LedgerOf::<T>::truncate_from(locks));
  let custody = Pallet::<T>::account_id();
  let held = T::Currency::balance(&custody);
  T::Currency::set_balance(&custody, held.saturating_add(DEPOSIT.saturating_mul(n.into())));
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn forward(l: Linear<0, { T::MaxLocks::get().saturating_sub(1) }>) -> Result<(), BenchmarkError> {
    T::BenchmarkHelper::set_time(BENCH_TIME);
    let (origin, who) = forward_caller::<T>()?;
    // Every existing lock is active, so the penalty scan counts all of them
    prefill_ledger::<T>(&who, l, BENCH_TIME.saturating_mul(2));
    LockAmount::<T>::put(DEPOSIT);
    LockDuration::<T>::put(1_000);
    SpamPenaltyFactor::<T>::put(PCT_BASE / 100);
    let script: ScriptOf<T> = BoundedVec::truncate_from(vec![0u8; T::MaxScriptLength::get() as usize]);

    #[extrinsic_call]
    _(origin as T::RuntimeOrigin, script);

    assert_eq!(Pallet::<T>::ledger_length(&who), l + 1);
    Ok(())
  }

  #[benchmark]
  fn withdraw(n: Linear<0, { T::MaxLocks::get() }>) -> Result<(), BenchmarkError> {
    T::BenchmarkHelper::set_time(BENCH_TIME);
    let (_, who) = forward_caller::<T>()?;
    // Every lock in the window matured, so each one is released and paid out
    prefill_ledger::<T>(&who, n, BENCH_TIME.saturating_sub(1));

    #[extrinsic_call]
    _(RawOrigin::Signed(who.clone()), n);

    assert_eq!(Pallet::<T>::ledger_length(&who), 0);
    Ok(())
  }

  #[benchmark]
  fn set_lock_duration() -> Result<(), BenchmarkError> {
    let origin =
      T::LockDurationOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

    #[extrinsic_call]
    _(origin as T::RuntimeOrigin, 2_000);

    assert_eq!(LockDuration::<T>::get(), 2_000);
    Ok(())
  }

  #[benchmark]
  fn set_lock_amount() -> Result<(), BenchmarkError> {
    let origin =
      T::LockAmountOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

    #[extrinsic_call]
    _(origin as T::RuntimeOrigin, 2_000);

    assert_eq!(LockAmount::<T>::get(), 2_000);
    Ok(())
  }

  #[benchmark]
  fn set_spam_penalty_factor() -> Result<(), BenchmarkError> {
    let origin =
      T::SpamPenaltyOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

    #[extrinsic_call]
    _(origin as T::RuntimeOrigin, PCT_BASE);

    assert_eq!(SpamPenaltyFactor::<T>::get(), PCT_BASE);
    Ok(())
  }

  impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Test);
}
