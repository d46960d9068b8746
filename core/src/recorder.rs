//! Couples a run id to the store so flows never touch SQL.
//!
//! Flows return `Vec<SimEvent>` from their mutators; the hosting code
//! hands those to a recorder, which serializes and appends them to the
//! event log under the flow's name.

use crate::{
    error::SimResult,
    event::{EventLogEntry, SimEvent},
    store::SimStore,
    types::{RunId, Tick},
};

pub struct EventRecorder<'a> {
    run_id: RunId,
    store:  &'a SimStore,
}

impl<'a> EventRecorder<'a> {
    pub fn new(store: &'a SimStore, run_id: RunId) -> Self {
        Self { run_id, store }
    }

    /// Register a fresh run with a generated id and log RunInitialized,
    /// so seed differences are observable from the event log alone.
    pub fn begin_run(store: &'a SimStore, seed: u64) -> SimResult<Self> {
        let run_id = uuid::Uuid::new_v4().to_string();
        Self::begin_run_with_id(store, run_id, seed)
    }

    /// Same, under a caller-chosen run id. Tests use this so two runs
    /// with the same seed produce byte-identical logs.
    pub fn begin_run_with_id(store: &'a SimStore, run_id: RunId, seed: u64) -> SimResult<Self> {
        store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;
        let recorder = Self::new(store, run_id);
        recorder.record(
            "run",
            0,
            &[SimEvent::RunInitialized { run_id: recorder.run_id.clone(), seed }],
        )?;
        Ok(recorder)
    }

    /// Append a batch of events under the given flow name.
    pub fn record(&self, flow: &str, tick: Tick, events: &[SimEvent]) -> SimResult<()> {
        for event in events {
            let entry = EventLogEntry {
                id:         None,
                run_id:     self.run_id.clone(),
                tick,
                flow:       flow.to_string(),
                event_type: event.type_name().to_string(),
                payload:    serde_json::to_string(event)?,
            };
            self.store.append_event(&entry)?;
        }
        Ok(())
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}
