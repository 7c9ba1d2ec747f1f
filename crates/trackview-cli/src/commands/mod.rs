pub mod monitor;
pub mod snapshot;

use std::path::Path;

use trackview_core::{PanelConfig, PresentationSender};

use crate::sim::Simulation;

/// Load panel settings, then let command-line flags override them.
pub fn panel_config(
    path: Option<&str>,
    update_delay_ms: Option<u64>,
    debug: bool,
) -> std::io::Result<PanelConfig> {
    let mut config = match path {
        Some(p) => PanelConfig::load(Path::new(p))?,
        None => PanelConfig::default(),
    };
    if let Some(ms) = update_delay_ms {
        config.update_delay_ms = ms;
    }
    if debug {
        config.debug = true;
    }
    Ok(config)
}

/// Same as [`panel_config`], but exits with a message on error.
pub fn panel_config_or_exit(
    path: Option<&str>,
    update_delay_ms: Option<u64>,
    debug: bool,
) -> PanelConfig {
    match panel_config(path, update_delay_ms, debug) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {}: {e}", path.unwrap_or("-"));
            std::process::exit(1);
        }
    }
}

/// Announce every simulated tracker to the presentation context.
pub fn announce(sim: &Simulation, sender: &PresentationSender) {
    for handle in sim.handles() {
        sender.new_tracker_added(handle.clone());
    }
}
