extern crate alloc;

use crate as pallet_time_lock;
use core::cell::RefCell;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl, ord_parameter_types, parameter_types,
  traits::{ConstU32, SortedMembers, Time},
};
use polkadot_sdk::frame_system::{self, EnsureRoot, EnsureSignedBy};
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};

use crate::types::Moment;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const CHARLIE: u64 = 3;
pub const TREASURER: u64 = 10;
pub const MODERATOR: u64 = 11;

pub const INITIAL_BALANCE: u128 = 1_000_000;
pub const GENESIS_TIME: Moment = 10_000;
pub const LOCK_DURATION: Moment = 1_000;
pub const LOCK_AMOUNT: u128 = 100;

/// Script that makes the mock executor fail
pub const REVERTING_SCRIPT: &[u8] = b"revert";

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    TimeLock: pallet_time_lock,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ExistentialDeposit;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

parameter_types! {
  pub static ExistentialDeposit: u128 = 1;
  pub static Now: Moment = GENESIS_TIME;
}

pub struct MockTime;
impl Time for MockTime {
  type Moment = Moment;
  fn now() -> Moment {
    Now::get()
  }
}

pub fn set_time(now: Moment) {
  Now::set(now);
}

thread_local! {
  static EXECUTED_SCRIPTS: RefCell<alloc::vec::Vec<(u64, alloc::vec::Vec<u8>)>> =
    const { RefCell::new(alloc::vec::Vec::new()) };
}

/// Scripts run by the mock executor, in execution order
pub fn executed_scripts() -> alloc::vec::Vec<(u64, alloc::vec::Vec<u8>)> {
  EXECUTED_SCRIPTS.with(|scripts| scripts.borrow().clone())
}

pub struct MockScriptExecutor;
impl pallet_time_lock::ForwardScript<u64> for MockScriptExecutor {
  fn execute(who: &u64, script: &[u8]) -> DispatchResult {
    if script == REVERTING_SCRIPT {
      return Err(DispatchError::Other("script reverted"));
    }
    EXECUTED_SCRIPTS.with(|scripts| scripts.borrow_mut().push((*who, script.to_vec())));
    Ok(())
  }
}

pub struct Forwarders;
impl SortedMembers<u64> for Forwarders {
  fn sorted_members() -> alloc::vec::Vec<u64> {
    alloc::vec![ALICE, BOB]
  }
}

ord_parameter_types! {
  pub const Treasurer: u64 = TREASURER;
  pub const Moderator: u64 = MODERATOR;
}

pub struct TimeLockPalletId;
impl polkadot_sdk::frame_support::traits::Get<PalletId> for TimeLockPalletId {
  fn get() -> PalletId {
    PalletId(*b"py/tmlck")
  }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl pallet_time_lock::BenchmarkHelper for MockBenchmarkHelper {
  fn set_time(now: Moment) {
    set_time(now);
  }
}

impl pallet_time_lock::Config for Test {
  type Currency = Balances;
  type Time = MockTime;
  type ForwardOrigin = EnsureSignedBy<Forwarders, u64>;
  type LockDurationOrigin = EnsureRoot<u64>;
  type LockAmountOrigin = EnsureSignedBy<Treasurer, u64>;
  type SpamPenaltyOrigin = EnsureSignedBy<Moderator, u64>;
  type ScriptExecutor = MockScriptExecutor;
  type PalletId = TimeLockPalletId;
  type MaxLocks = ConstU32<8>;
  type MaxScriptLength = ConstU32<64>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: alloc::vec![
      (ALICE, INITIAL_BALANCE),
      (BOB, INITIAL_BALANCE),
      (CHARLIE, INITIAL_BALANCE),
    ],
    ..Default::default()
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_time_lock::GenesisConfig::<Test> {
    lock_duration: LOCK_DURATION,
    lock_amount: LOCK_AMOUNT,
    spam_penalty_factor: 0,
    _marker: Default::default(),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| {
    System::set_block_number(1);
    set_time(GENESIS_TIME);
  });
  ext
}
