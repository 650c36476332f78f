//! Place finder desktop application.
//!
//! Credentials are taken from `PLACEFINDER_ACCESS_KEY_ID` and `PLACEFINDER_ACCESS_KEY_SECRET`,
//! either at build time or at run time.

use placefinder::config::SdkOptions;
use placefinder_egui::InitBuilder;

fn main() -> anyhow::Result<()> {
    let sdk_options = SdkOptions::from_env()?;
    InitBuilder::new(sdk_options).init()
}
