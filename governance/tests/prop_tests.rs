use covenant_governance::{
    isqrt, resolve, vote_weight, GovernanceError, Governor, Outcome, ProposalDraft,
};
use covenant_ledger::VoteLedger;
use covenant_nullables::NullChain;
use covenant_timelock::Timelock;
use covenant_types::{
    AccountId, CallDescriptor, ExecutionEnvironment, GovernanceParams, TimelockParams,
};
use proptest::prelude::*;

fn governor_with(voters: &[u128]) -> (Governor, NullChain) {
    let chain = NullChain::new(1, 1_000_000);
    let h = chain.current_height();
    let mut ledger = VoteLedger::new();
    let proposer = AccountId::new("proposer");
    ledger.mint(&proposer, 1_000, h).unwrap();
    ledger.delegate(&proposer, &proposer, h).unwrap();
    for (i, amount) in voters.iter().enumerate() {
        let voter = AccountId::new(format!("voter{i}"));
        ledger.mint(&voter, *amount, h).unwrap();
        ledger.delegate(&voter, &voter, h).unwrap();
    }
    let params = GovernanceParams {
        proposal_threshold: 1_000,
        quorum_votes: 50,
        voting_delay: 1,
        voting_period: 5,
        ..GovernanceParams::default()
    };
    let timelock = Timelock::new(
        AccountId::new("timelock"),
        AccountId::new("governor"),
        TimelockParams::default(),
    )
    .unwrap();
    let gov = Governor::new(
        AccountId::new("governor"),
        AccountId::new("guardian"),
        params,
        ledger,
        timelock,
    )
    .unwrap();
    chain.advance_blocks(1);
    (gov, chain)
}

proptest! {
    #[test]
    fn isqrt_is_floor_sqrt(n in any::<u128>()) {
        let r = isqrt(n);
        prop_assert!(r * r <= n);
        // (r + 1)^2 may overflow only when r is u64::MAX.
        if let Some(next) = (r + 1).checked_mul(r + 1) {
            prop_assert!(next > n);
        }
    }

    #[test]
    fn ties_never_pass(votes in any::<u128>(), quorum in any::<u128>()) {
        prop_assert_eq!(resolve(votes, votes, quorum), Outcome::Defeated);
    }

    /// Each voter votes once with a random share of their stake. Weights are
    /// exactly `floor(sqrt(raw))`, second votes are rejected, and the totals
    /// add up.
    #[test]
    fn votes_are_quadratic_and_single_use(
        stakes in prop::collection::vec((1u128..1_000_000, 1u128..=100, any::<bool>()), 1..8),
    ) {
        let balances: Vec<u128> = stakes.iter().map(|(b, _, _)| *b).collect();
        let (mut gov, chain) = governor_with(&balances);
        let call = CallDescriptor::new(AccountId::new("target"), 0, "poke()", vec![]);
        let id = gov
            .propose(&AccountId::new("proposer"), ProposalDraft::new("p").action(call), &chain)
            .unwrap();
        chain.advance_blocks(1);

        let (mut for_votes, mut against_votes, mut raw_for, mut raw_against) = (0u128, 0u128, 0u128, 0u128);
        for (i, (balance, pct, support)) in stakes.iter().enumerate() {
            let voter = AccountId::new(format!("voter{i}"));
            let raw = (balance * pct / 100).max(1);
            let weight = gov.cast_vote(&voter, id, *support, raw, &chain).unwrap();
            prop_assert_eq!(weight, vote_weight(raw));
            if *support {
                for_votes += weight;
                raw_for += raw;
            } else {
                against_votes += weight;
                raw_against += raw;
            }
            let again = gov.cast_vote(&voter, id, *support, 1, &chain);
            prop_assert!(matches!(again, Err(GovernanceError::AlreadyVoted(_))), "second vote accepted");
            prop_assert_eq!(gov.ledger().locked_of(&voter), raw);
        }

        let p = gov.proposal(id).unwrap();
        prop_assert_eq!(p.for_votes, for_votes);
        prop_assert_eq!(p.against_votes, against_votes);
        prop_assert_eq!(p.raw_for_votes, raw_for);
        prop_assert_eq!(p.raw_against_votes, raw_against);
        prop_assert!(p.total_raw_votes() <= gov.ledger().total_supply());
    }

    /// State is a pure function of stored fields, height and time.
    #[test]
    fn state_reads_agree(blocks in 0u64..20, secs in 0u64..2_000_000) {
        let (mut gov, chain) = governor_with(&[10_000]);
        let call = CallDescriptor::new(AccountId::new("target"), 0, "poke()", vec![]);
        let id = gov
            .propose(&AccountId::new("proposer"), ProposalDraft::new("p").action(call), &chain)
            .unwrap();
        chain.advance_blocks(blocks);
        chain.advance(secs);
        let first = gov.state(id, &chain).unwrap();
        let second = gov.state(id, &chain).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, gov.proposal(id).unwrap().state(
            chain.current_height(),
            chain.current_time(),
            gov.timelock().grace_period(),
        ));
    }
}
