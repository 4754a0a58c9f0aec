// Library root
// -----------
// The binary (`main.rs`) wires these modules into a single pass over a
// CSV file of device groups (DGRPs), posting each one to the config API
// under the IGRP given on the command line.
//
// Module responsibilities:
// - `cli`: flag definitions and validation into a `Config`.
// - `error`: typed errors for configuration and row mapping.
// - `dgrp`: the per-row column -> value mapping.
// - `api`: blocking HTTP client that creates a DGRP with basic auth.
// - `import`: the read, map, submit loop over the CSV records.
// - `ui`: terminal prompts for credentials and the request spinner.
pub mod api;
pub mod cli;
pub mod dgrp;
pub mod error;
pub mod import;
pub mod ui;
