// src/constants.rs
//
// Application-wide constants extracted from magic numbers throughout the codebase.
// Each constant is documented with its purpose and usage context.

/// Number of commands that may wait in the workflow queue before senders block.
///
/// Used in: `application/workflow_actor.rs`
pub const WORKFLOW_QUEUE_CAPACITY: usize = 32;

/// Application directory name below the platform config and data directories.
///
/// Used in: `config.rs`
pub const APP_DIR_NAME: &str = "notekeeper";

/// File name of the configuration file inside the config directory.
///
/// Used in: `config.rs`
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Delay in milliseconds after writing the HTML page before opening the browser.
///
/// On macOS, the browser needs a brief moment for the file to be fully written
/// and indexed before opening. Without this delay, the browser may open an empty
/// or incomplete file.
///
/// Used in: `infrastructure/renderer.rs`
pub const BROWSER_LAUNCH_DELAY_MS: u64 = 500;

/// Width in pixels of note images on the rendered page.
///
/// Used in: `ports/html.rs`
pub const IMAGE_WIDTH_PX: u32 = 400;
