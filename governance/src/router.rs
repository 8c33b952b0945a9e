//! Call routing for timelock execution.
//!
//! Calls that target the governor's own address are self-amendments and are
//! applied to its parameters. Everything else goes to the environment.

use crate::events::GovernanceEvent;
use crate::params::GovernableParam;
use covenant_types::{
    AccountId, BlockHeight, CallDescriptor, ExecutionEnvironment, GovernanceParams, Revert,
    Timestamp,
};
use tracing::info;

pub(crate) struct GovernorRouter<'a> {
    pub governor: &'a AccountId,
    pub params: &'a mut GovernanceParams,
    pub events: &'a mut Vec<GovernanceEvent>,
    pub env: &'a mut dyn ExecutionEnvironment,
}

impl GovernorRouter<'_> {
    fn apply_self_call(&mut self, call: &CallDescriptor) -> Result<(), Revert> {
        let param = GovernableParam::from_signature(&call.signature)
            .ok_or_else(|| Revert::new(format!("governor has no method {}", call.signature)))?;
        let value: u128 = call.decode_args().map_err(|e| Revert::new(e.to_string()))?;
        let old = param.current(self.params);
        param
            .apply(self.params, value)
            .map_err(|e| Revert::new(e.to_string()))?;
        info!(%param, old, new = value, "governance parameter changed");
        self.events.push(GovernanceEvent::ParamChanged {
            param,
            old,
            new: value,
        });
        Ok(())
    }
}

impl ExecutionEnvironment for GovernorRouter<'_> {
    fn current_height(&self) -> BlockHeight {
        self.env.current_height()
    }

    fn current_time(&self) -> Timestamp {
        self.env.current_time()
    }

    fn dispatch(&mut self, call: &CallDescriptor) -> Result<(), Revert> {
        if &call.target == self.governor {
            self.apply_self_call(call)
        } else {
            self.env.dispatch(call)
        }
    }
}
