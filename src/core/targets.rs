//! String constants for [`tracing`] targets, so that log filtering can be
//! scoped per subsystem (`RUST_LOG=lastfit_core::batch=debug`, etc.)

use crate::tracing_targets;

tracing_targets! {
    REGISTRATION = "registration",
    CLEARANCE = "clearance",
    SDF = "sdf",
    BATCH = "batch",
    MESH = "mesh",
}
