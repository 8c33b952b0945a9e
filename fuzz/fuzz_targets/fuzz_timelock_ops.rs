#![no_main]

use libfuzzer_sys::fuzz_target;

use covenant_nullables::NullChain;
use covenant_timelock::Timelock;
use covenant_types::{AccountId, CallDescriptor, ExecutionEnvironment, TimelockParams};

// Random sequences of queue, execute, cancel and clock moves. No operation
// may panic, and an executed transaction must leave the queue.
fuzz_target!(|data: &[u8]| {
    let admin = AccountId::new("admin");
    let Ok(mut timelock) = Timelock::new(
        AccountId::new("timelock"),
        admin.clone(),
        TimelockParams::default(),
    ) else {
        return;
    };
    let mut chain = NullChain::default();

    for op in data.chunks_exact(4) {
        let call = CallDescriptor::new(
            AccountId::new("target"),
            u128::from(op[1]),
            "poke()",
            vec![op[2]],
        );
        let eta = chain
            .current_time()
            .saturating_add(u64::from(op[3]) * 3600);
        match op[0] % 4 {
            0 => {
                let _ = timelock.queue_transaction(&admin, call, eta, chain.current_time());
            }
            1 => {
                if let Ok(hash) = timelock.execute_transaction(&call, eta, &mut chain) {
                    assert!(!timelock.is_queued(&hash));
                }
            }
            2 => {
                let _ = timelock.cancel_transaction(&admin, &call, eta);
            }
            _ => chain.advance(u64::from(op[3]) * 3600),
        }
    }
});
