//! Human-readable output for the `run` and `graph` commands.
use ignite_core::kernel::BootstrapSnapshot;
use ignite_core::registry::BlockedComponent;
use ignite_core::{BootstrapOutcome, ComponentId};

fn join(ids: &[ComponentId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter().map(ComponentId::as_str).collect::<Vec<_>>().join(", ")
}

/// One row per component in registration order
pub fn print_status(snapshot: &BootstrapSnapshot) {
    println!("{:<24} {:<14} DEPENDS ON", "COMPONENT", "STATE");
    for row in &snapshot.components {
        let state = row.state.to_string();
        match &row.failure {
            Some(reason) => println!(
                "{:<24} {:<14} {} ({})",
                row.id.as_str(),
                state,
                join(&row.dependencies),
                reason
            ),
            None => println!("{:<24} {:<14} {}", row.id.as_str(), state, join(&row.dependencies)),
        }
    }
}

pub fn print_outcome(outcome: &BootstrapOutcome, frames: u64) {
    match outcome {
        BootstrapOutcome::Complete { total, ticks, .. } => {
            println!(
                "Bootstrap complete: {}/{} components initialized ({} ticks, {} frames)",
                total, total, ticks, frames
            );
        }
        BootstrapOutcome::Incomplete {
            initialized,
            failed,
            total,
            blocked,
            ..
        } => {
            println!(
                "Bootstrap incomplete: {}/{} components initialized, {} failed",
                initialized, total, failed
            );
            print_blocked(blocked);
        }
    }
}

fn print_blocked(blocked: &[BlockedComponent]) {
    for entry in blocked {
        println!("  {}", entry);
    }
}

pub fn print_graph_row(id: &ComponentId, dependencies: &[ComponentId]) {
    println!("{:<24} {}", id.as_str(), join(dependencies));
}

pub fn print_wave(index: usize, ids: &[ComponentId]) {
    println!("  wave {}: {}", index, join(ids));
}
