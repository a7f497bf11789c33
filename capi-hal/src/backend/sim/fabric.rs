//! Simulated audio fabric.
//!
//! A sink carries one stream at a time, while a source may fan out to any
//! number of sinks. The fabric clock is shared, so the sample rate can only
//! change while nothing is connected.

use std::collections::BTreeSet;

use super::{device_id, release, require_nonzero};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::peripheral::fabric::{AudioFabric, FabricConfig, FabricHandle, FabricOps};
use crate::registry::{BackendDescriptor, BackendTable};
use crate::tracing::prelude::*;

#[derive(Debug)]
struct SimFabric {
    sinks: u32,
    sample_rates: Vec<u32>,
    sample_rate_hz: u32,
    // (source, sink)
    connections: BTreeSet<(u32, u32)>,
}

impl SimFabric {
    fn check_sink(&self, sink: u32) -> Result<()> {
        if sink >= self.sinks {
            return Err(Error::OutOfRange {
                what: "fabric sink",
                value: sink.into(),
                max: (self.sinks - 1).into(),
            });
        }
        Ok(())
    }

    fn feeding(&self, sink: u32) -> Option<u32> {
        self.connections
            .iter()
            .find(|(_, s)| *s == sink)
            .map(|(source, _)| *source)
    }
}

fn endpoints(handle: &mut FabricHandle, source: u32, sink: u32) -> Result<&mut SimFabric> {
    handle.check_resource("fabric source", source)?;
    let fabric = handle.state_mut::<SimFabric>()?;
    fabric.check_sink(sink)?;
    Ok(fabric)
}

fn init(slot: &mut Option<FabricHandle>, config: &FabricConfig) -> Result<()> {
    let settings = &config.settings;
    let sources = require_nonzero("fabric sources", settings.sources)?;
    let sinks = require_nonzero("fabric sinks", settings.sinks)?;
    let Some(&sample_rate_hz) = settings.sample_rates.first() else {
        return Err(Error::Config("fabric needs at least one sample rate".into()));
    };

    let fabric = SimFabric {
        sinks,
        sample_rates: settings.sample_rates.clone(),
        sample_rate_hz,
        connections: BTreeSet::new(),
    };
    let id = device_id(config.identifier)?;
    debug!(
        id,
        sources,
        sinks,
        sample_rate_hz,
        "Simulated audio fabric initialized"
    );
    *slot = Some(Handle::new(id, sources, fabric));
    Ok(())
}

fn connect(handle: &mut FabricHandle, source: u32, sink: u32) -> Result<()> {
    let fabric = endpoints(handle, source, sink)?;
    match fabric.feeding(sink) {
        Some(current) if current == source => Ok(()),
        Some(current) => {
            debug!(source, sink, current, "Fabric sink already in use");
            Err(Error::Busy)
        }
        None => {
            fabric.connections.insert((source, sink));
            debug!(source, sink, "Fabric route connected");
            Ok(())
        }
    }
}

fn disconnect(handle: &mut FabricHandle, source: u32, sink: u32) -> Result<()> {
    let fabric = endpoints(handle, source, sink)?;
    if fabric.connections.remove(&(source, sink)) {
        debug!(source, sink, "Fabric route disconnected");
    }
    Ok(())
}

fn is_connected(handle: &mut FabricHandle, source: u32, sink: u32) -> Result<bool> {
    Ok(endpoints(handle, source, sink)?.connections.contains(&(source, sink)))
}

fn set_sample_rate(handle: &mut FabricHandle, hz: u32) -> Result<()> {
    let fabric = handle.state_mut::<SimFabric>()?;
    if !fabric.sample_rates.contains(&hz) {
        return Err(Error::OutOfRange {
            what: "fabric sample rate",
            value: hz.into(),
            max: fabric.sample_rates.iter().max().copied().unwrap_or_default().into(),
        });
    }
    if !fabric.connections.is_empty() {
        return Err(Error::Busy);
    }
    fabric.sample_rate_hz = hz;
    info!(hz, "Fabric sample rate changed");
    Ok(())
}

pub static SIM_FABRIC_OPS: FabricOps = FabricOps {
    init: Some(init),
    deinit: Some(release::<AudioFabric>),
    connect: Some(connect),
    disconnect: Some(disconnect),
    is_connected: Some(is_connected),
    set_sample_rate: Some(set_sample_rate),
};

inventory::submit! {
    BackendDescriptor {
        name: "sim-fabric",
        description: "In-memory audio router with single-source sinks",
        table: BackendTable::AudioFabric(&SIM_FABRIC_OPS),
    }
}
