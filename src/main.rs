//! Client entrypoint for the CSR build.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use constellation_net::{init_logging, mount_page};

fn main() {
	init_logging();
	mount_page();
}
