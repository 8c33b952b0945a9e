#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Restoring persisted state from arbitrary bytes must fail cleanly.
    let _ = covenant_governance::Governor::load_state(data);
    let _ = covenant_ledger::VoteLedger::load_state(data);

    let _ = bincode::deserialize::<covenant_timelock::Timelock>(data);
    let _ = bincode::deserialize::<covenant_types::CallDescriptor>(data);
    let _ = bincode::deserialize::<covenant_types::TxHash>(data);

    // Calldata for the self-administration calls.
    let _ = covenant_types::call::decode_args::<covenant_types::AccountId>(data);
    let _ = covenant_types::call::decode_args::<u128>(data);
});
