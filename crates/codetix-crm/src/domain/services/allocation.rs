//! Fair-share lead allocation
//!
//! Two greedy passes over a single pending queue. The zone pass lets each
//! agent pick leads in its own locality first and backfill from whatever is
//! left. The backfill pass hands out any remaining leads FIFO to agents that
//! still have capacity. The queue moves by value through both passes, so a
//! lead can only ever end up in one batch.

use std::collections::VecDeque;

use crate::domain::aggregates::{Agent, Lead};
use crate::domain::value_objects::Zone;

/// Default cap on in-progress leads per agent
pub const DEFAULT_MAX_ACTIVE_LEADS: u32 = 15;

/// An agent together with its active-lead count at planning time
#[derive(Clone, Debug)]
pub struct AgentCapacity {
    pub agent: Agent,
    pub active_leads: u32,
}

impl AgentCapacity {
    pub fn new(agent: Agent, active_leads: u32) -> Self {
        Self { agent, active_leads }
    }
}

/// Leads planned for one agent, zone pass first, then backfill
#[derive(Clone, Debug)]
pub struct AgentBatch {
    pub agent: Agent,
    pub active_before: u32,
    pub leads: Vec<Lead>,
    pub zone_matches: usize,
}

impl AgentBatch {
    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

/// Result of planning a distribution run
#[derive(Clone, Debug)]
pub struct AllocationPlan {
    /// One batch per agent, in the order agents were supplied
    pub batches: Vec<AgentBatch>,
    /// Leads nobody had room for
    pub unallocated: VecDeque<Lead>,
}

impl AllocationPlan {
    pub fn total_allocated(&self) -> usize {
        self.batches.iter().map(|b| b.leads.len()).sum()
    }

    /// Batches that actually received leads
    pub fn non_empty(&self) -> impl Iterator<Item = &AgentBatch> {
        self.batches.iter().filter(|b| !b.is_empty())
    }
}

/// Lead allocation domain service
#[derive(Clone, Copy, Debug)]
pub struct LeadAllocator {
    max_active_leads: u32,
}

impl Default for LeadAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ACTIVE_LEADS)
    }
}

impl LeadAllocator {
    pub fn new(max_active_leads: u32) -> Self {
        Self { max_active_leads }
    }

    pub fn max_active_leads(&self) -> u32 {
        self.max_active_leads
    }

    /// Plan a full run against a single capacity snapshot. `pending` must be
    /// ordered oldest first.
    pub fn plan(&self, agents: Vec<AgentCapacity>, pending: VecDeque<Lead>) -> AllocationPlan {
        let plan = self.zone_pass(agents, pending);
        if plan.unallocated.is_empty() {
            return plan;
        }
        let counts: Vec<u32> = plan.batches.iter().map(|b| b.active_before).collect();
        self.backfill_pass(plan, &counts)
    }

    /// Pass one: each agent with free slots takes zone matches first, then
    /// the oldest non-matching leads. Stops once the queue is empty.
    pub fn zone_pass(&self, agents: Vec<AgentCapacity>, mut pending: VecDeque<Lead>) -> AllocationPlan {
        let mut batches: Vec<AgentBatch> = agents
            .into_iter()
            .map(|c| AgentBatch {
                agent: c.agent,
                active_before: c.active_leads,
                leads: Vec::new(),
                zone_matches: 0,
            })
            .collect();

        for batch in batches.iter_mut() {
            let missing = self.missing(batch.active_before, batch.leads.len());
            if missing == 0 {
                continue;
            }

            let (selected, zone_matches, remainder) = pull_leads(batch.agent.zone(), missing, pending);
            pending = remainder;
            batch.zone_matches = zone_matches;
            batch.leads = selected;

            if pending.is_empty() {
                break;
            }
        }

        AllocationPlan { batches, unallocated: pending }
    }

    /// Pass two: plain FIFO top-up of whatever is still pending.
    ///
    /// `active_counts[i]` is the freshly read active-lead count of the i-th
    /// agent; a missing entry falls back to the count seen in pass one.
    pub fn backfill_pass(&self, plan: AllocationPlan, active_counts: &[u32]) -> AllocationPlan {
        let AllocationPlan { mut batches, unallocated: mut pending } = plan;

        for (i, batch) in batches.iter_mut().enumerate() {
            if pending.is_empty() {
                break;
            }
            let active = active_counts.get(i).copied().unwrap_or(batch.active_before);
            let missing = self.missing(active, batch.leads.len());
            if missing == 0 {
                continue;
            }

            let take = missing.min(pending.len());
            batch.leads.extend(pending.drain(..take));
        }

        AllocationPlan { batches, unallocated: pending }
    }

    /// Free slots given an active count and what is already planned this run
    fn missing(&self, active: u32, planned: usize) -> usize {
        (self.max_active_leads as usize).saturating_sub(active as usize + planned)
    }
}

/// Select up to `amount` leads for an agent in `zone`.
///
/// Zone matches are taken in queue order until `amount` are selected; if
/// there are not enough, the shortfall is taken from the front of the
/// non-matching remainder. Returns the selection, how many of them were
/// zone matches, and the leads left over (order preserved).
pub fn pull_leads(
    zone: Option<&Zone>,
    amount: usize,
    pending: VecDeque<Lead>,
) -> (Vec<Lead>, usize, VecDeque<Lead>) {
    if amount == 0 {
        return (Vec::new(), 0, pending);
    }

    let mut selected = Vec::with_capacity(amount.min(pending.len()));
    let mut remaining = VecDeque::with_capacity(pending.len());

    for lead in pending {
        let matches = zone.map(|z| z.matches(lead.zone())).unwrap_or(false);
        if selected.len() < amount && matches {
            selected.push(lead);
        } else {
            remaining.push_back(lead);
        }
    }

    let zone_matches = selected.len();
    let still_needed = (amount - zone_matches).min(remaining.len());
    selected.extend(remaining.drain(..still_needed));

    (selected, zone_matches, remaining)
}
