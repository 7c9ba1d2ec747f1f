use std::sync::Arc;
use std::time::Duration;

use log::info;
use trackview_core::{MemoryConfigStore, PanelConfig, PanelModel};

use crate::sim::{SimOptions, Simulation};

/// How often the simulated devices produce a sample.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

pub fn run(config: PanelConfig, opts: SimOptions) {
    info!(
        "monitor: {} simulated IMUs ({} adjusted), update delay {}ms, debug {}",
        opts.imus, opts.adjusted, config.update_delay_ms, config.debug
    );
    let model = PanelModel::new(config, Box::new(MemoryConfigStore::new()));

    let sim = Arc::new(Simulation::new(opts, &mut rand::rng()));
    super::announce(&sim, &model.sender());
    let mut driver = Arc::clone(&sim).spawn(SAMPLE_INTERVAL);

    let mut app = crate::tui::app::App::new(model);
    let result = app.run();
    driver.stop();

    if let Err(e) = result {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
